use anyhow::Context;
use clap::Parser;
use mawp_calc::{Report, VesselInput};

#[derive(Parser)]
#[command(
    name = "mawp",
    about = "Shell and head MAWP check for a cylindrical pressure vessel (ASME VIII)",
    version
)]
struct Cli {
    /// Measured shell thickness, inches
    #[arg(long, short = 't')]
    thickness: Option<f64>,

    /// Allowable stress, psi
    #[arg(long, short = 's')]
    stress: Option<f64>,

    /// Joint efficiency, 0 < E <= 1
    #[arg(long, short = 'e')]
    efficiency: Option<f64>,

    /// Inside diameter, inches
    #[arg(long, short = 'd')]
    diameter: Option<f64>,

    /// Measured head thickness, inches
    #[arg(long)]
    head_thickness: Option<f64>,

    /// Design pressure, psi
    #[arg(long, short = 'p')]
    pressure: Option<f64>,

    /// Output as JSON
    #[arg(long, short = 'j')]
    json: bool,
}

impl Cli {
    fn input(&self) -> VesselInput {
        let d = VesselInput::default();
        VesselInput {
            shell_thickness: self.thickness.unwrap_or(d.shell_thickness),
            allowable_stress: self.stress.unwrap_or(d.allowable_stress),
            joint_efficiency: self.efficiency.unwrap_or(d.joint_efficiency),
            inside_diameter: self.diameter.unwrap_or(d.inside_diameter),
            head_thickness: self.head_thickness.unwrap_or(d.head_thickness),
            design_pressure: self.pressure.unwrap_or(d.design_pressure),
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let report = Report::compute(cli.input()).context("invalid vessel input")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
