//! Maximum allowable working pressure for a cylindrical shell with 2:1
//! ellipsoidal heads (ASME Section VIII, Division 1).
//!
//! Units are inches and psi throughout.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MawpError {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("joint efficiency must be at most 1.0, got {0}")]
    EfficiencyAboveOne(f64),

    #[error("design pressure {pressure} psi is at or above the S·E/0.6 limit; no shell thickness can hold it")]
    PressureTooHigh { pressure: f64 },
}

pub type Result<T> = std::result::Result<T, MawpError>;

/// Vessel geometry, material and design pressure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VesselInput {
    /// Measured shell thickness `t`.
    pub shell_thickness: f64,
    /// Allowable stress `S`.
    pub allowable_stress: f64,
    /// Joint efficiency `E`, in (0, 1].
    pub joint_efficiency: f64,
    /// Inside diameter `D`.
    pub inside_diameter: f64,
    /// Measured head thickness.
    pub head_thickness: f64,
    pub design_pressure: f64,
}

impl Default for VesselInput {
    /// The recorded vessel: SA-612 at 125°F, full RT, 2025 UT readings.
    fn default() -> Self {
        VesselInput {
            shell_thickness: 0.8006,
            allowable_stress: 20000.0,
            joint_efficiency: 1.0,
            inside_diameter: 130.26,
            head_thickness: 0.5070,
            design_pressure: 280.0,
        }
    }
}

impl VesselInput {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("shell thickness", self.shell_thickness),
            ("allowable stress", self.allowable_stress),
            ("joint efficiency", self.joint_efficiency),
            ("inside diameter", self.inside_diameter),
            ("head thickness", self.head_thickness),
            ("design pressure", self.design_pressure),
        ] {
            // `!(v > 0)` also catches NaN.
            if !(value > 0.0) {
                return Err(MawpError::NonPositive { name, value });
            }
        }
        if self.joint_efficiency > 1.0 {
            return Err(MawpError::EfficiencyAboveOne(self.joint_efficiency));
        }
        if self.stress_margin() <= 0.0 {
            return Err(MawpError::PressureTooHigh {
                pressure: self.design_pressure,
            });
        }
        Ok(())
    }

    pub fn inside_radius(&self) -> f64 {
        self.inside_diameter / 2.0
    }

    /// `S·E − 0.6·P`, the denominator of the minimum-thickness formula.
    fn stress_margin(&self) -> f64 {
        self.allowable_stress * self.joint_efficiency - 0.6 * self.design_pressure
    }
}

/// Shell: `S·E·t / (R + 0.6·t)`.
pub fn shell_mawp(input: &VesselInput) -> f64 {
    let t = input.shell_thickness;
    input.allowable_stress * input.joint_efficiency * t / (input.inside_radius() + 0.6 * t)
}

/// Minimum shell thickness for the design pressure: `P·R / (S·E − 0.6·P)`.
pub fn min_shell_thickness(input: &VesselInput) -> f64 {
    input.design_pressure * input.inside_radius() / input.stress_margin()
}

/// 2:1 ellipsoidal head: `2·S·E·t / (D + 0.2·t)`.
pub fn head_mawp(input: &VesselInput) -> f64 {
    let t = input.head_thickness;
    2.0 * input.allowable_stress * input.joint_efficiency * t / (input.inside_diameter + 0.2 * t)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    Safe,
    /// Shell MAWP below design pressure; de-rate to this whole-psi value or repair.
    Unsafe { derate_to: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub input: VesselInput,
    pub inside_radius: f64,
    pub shell_mawp: f64,
    pub min_shell_thickness: f64,
    /// `t_min − t`; negative when the shell has spare thickness.
    pub thickness_deficit: f64,
    pub head_mawp: f64,
    pub governing_mawp: f64,
    pub verdict: Verdict,
}

impl Report {
    pub fn compute(input: VesselInput) -> Result<Self> {
        input.validate()?;

        let shell = shell_mawp(&input);
        let head = head_mawp(&input);
        let t_min = min_shell_thickness(&input);
        let verdict = if shell >= input.design_pressure {
            Verdict::Safe
        } else {
            Verdict::Unsafe {
                derate_to: shell.round(),
            }
        };
        tracing::debug!(shell, head, t_min, "mawp computed");

        Ok(Report {
            input,
            inside_radius: input.inside_radius(),
            shell_mawp: shell,
            min_shell_thickness: t_min,
            thickness_deficit: t_min - input.shell_thickness,
            head_mawp: head,
            governing_mawp: shell.min(head),
            verdict,
        })
    }
}

/// `20000.0` as `20,000`, `17500.5` as `17,500.5`.
fn group_thousands(value: f64) -> String {
    let text = value.to_string();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int, frac) = match unsigned.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, digit) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    match frac {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let i = &self.input;
        let rule = "=".repeat(60);
        let (s, e, t, r) = (
            i.allowable_stress,
            i.joint_efficiency,
            i.shell_thickness,
            self.inside_radius,
        );

        writeln!(f, "{rule}")?;
        writeln!(f, "SHELL MAWP CALCULATION (ASME Section VIII)")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Current Thickness (t): {t:.4} in")?;
        writeln!(f, "Allowable Stress (S): {} psi", group_thousands(s))?;
        writeln!(f, "Joint Efficiency (E): {e:?}")?;
        writeln!(f, "Inside Diameter (D): {} in", i.inside_diameter)?;
        writeln!(f, "Inside Radius (R): {r:.2} in")?;
        writeln!(f)?;
        writeln!(f, "Formula: MAWP = SEt / (R + 0.6t)")?;
        writeln!(f, "MAWP = ({s} x {e:?} x {t:.4}) / ({r:.2} + 0.6 x {t:.4})")?;
        writeln!(f, "MAWP = {:.2} / {:.4}", s * e * t, r + 0.6 * t)?;
        writeln!(f)?;
        writeln!(f, ">>> CALCULATED SHELL MAWP = {:.1} psi <<<", self.shell_mawp)?;
        writeln!(f)?;

        let p = i.design_pressure;
        writeln!(f, "Design Pressure: {p} psi")?;
        match self.verdict {
            Verdict::Safe => writeln!(
                f,
                "SAFE: MAWP ({:.1} psi) >= Design Pressure ({p} psi)",
                self.shell_mawp
            )?,
            Verdict::Unsafe { derate_to } => {
                writeln!(
                    f,
                    "UNSAFE: MAWP ({:.1} psi) < Design Pressure ({p} psi)",
                    self.shell_mawp
                )?;
                writeln!(f, "  Vessel must be de-rated to {derate_to:.0} psi or repaired")?;
            }
        }
        writeln!(f)?;
        writeln!(
            f,
            "Minimum thickness required for {p} psi: {:.4} in",
            self.min_shell_thickness
        )?;
        writeln!(f, "Current thickness: {t:.4} in")?;
        writeln!(f, "Thickness deficit: {:.4} in", self.thickness_deficit)?;
        writeln!(f)?;

        writeln!(f, "{rule}")?;
        writeln!(f, "HEAD MAWP CALCULATION (2:1 Ellipsoidal)")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Current Head Thickness: {:.4} in", i.head_thickness)?;
        writeln!(f, "Formula: MAWP = 2SEt / (D + 0.2t)")?;
        writeln!(f, ">>> HEAD MAWP = {:.1} psi <<<", self.head_mawp)?;
        writeln!(f)?;

        writeln!(f, "{rule}")?;
        writeln!(f, ">>> GOVERNING MAWP = {:.1} psi <<<", self.governing_mawp)?;
        write!(f, "{rule}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn recorded_vessel_values() {
        let input = VesselInput::default();
        assert!(close(input.inside_radius(), 65.13));
        assert!(close(shell_mawp(&input), 244.0468));
        assert!(close(min_shell_thickness(&input), 0.9195));
        assert!(close(head_mawp(&input), 155.5675));
    }

    #[test]
    fn recorded_vessel_is_unsafe_and_head_governs() {
        let report = Report::compute(VesselInput::default()).unwrap();
        assert_eq!(report.verdict, Verdict::Unsafe { derate_to: 244.0 });
        assert!(close(report.governing_mawp, report.head_mawp));
        assert!(report.thickness_deficit > 0.0);
    }

    #[test]
    fn thick_shell_is_safe() {
        let input = VesselInput {
            shell_thickness: 1.0,
            ..VesselInput::default()
        };
        let report = Report::compute(input).unwrap();
        assert_eq!(report.verdict, Verdict::Safe);
        assert!(report.thickness_deficit < 0.0);
    }

    #[test]
    fn rejects_non_positive_inputs() {
        let input = VesselInput {
            inside_diameter: 0.0,
            ..VesselInput::default()
        };
        assert_eq!(
            input.validate(),
            Err(MawpError::NonPositive {
                name: "inside diameter",
                value: 0.0
            })
        );

        let input = VesselInput {
            shell_thickness: f64::NAN,
            ..VesselInput::default()
        };
        assert!(matches!(input.validate(), Err(MawpError::NonPositive { .. })));
    }

    #[test]
    fn rejects_efficiency_above_one() {
        let input = VesselInput {
            joint_efficiency: 1.2,
            ..VesselInput::default()
        };
        assert_eq!(input.validate(), Err(MawpError::EfficiencyAboveOne(1.2)));
    }

    #[test]
    fn rejects_pressure_beyond_stress_limit() {
        let input = VesselInput {
            design_pressure: 40000.0,
            ..VesselInput::default()
        };
        assert!(matches!(
            Report::compute(input),
            Err(MawpError::PressureTooHigh { .. })
        ));
    }

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(group_thousands(20000.0), "20,000");
        assert_eq!(group_thousands(17500.5), "17,500.5");
        assert_eq!(group_thousands(950.0), "950");
        assert_eq!(group_thousands(1234567.0), "1,234,567");
    }

    #[test]
    fn report_input_lines_match_the_worksheet() {
        let text = Report::compute(VesselInput::default()).unwrap().to_string();
        assert!(text.contains("Allowable Stress (S): 20,000 psi\n"));
        assert!(text.contains("Joint Efficiency (E): 1.0\n"));
        assert!(text.contains("Inside Diameter (D): 130.26 in\n"));
        assert!(text.contains("MAWP = (20000 x 1.0 x 0.8006) / (65.13 + 0.6 x 0.8006)"));

        let derated = VesselInput {
            joint_efficiency: 0.85,
            ..VesselInput::default()
        };
        let text = Report::compute(derated).unwrap().to_string();
        assert!(text.contains("Joint Efficiency (E): 0.85\n"));
    }

    #[test]
    fn report_text_carries_the_key_lines() {
        let text = Report::compute(VesselInput::default()).unwrap().to_string();
        assert!(text.contains(">>> CALCULATED SHELL MAWP = 244.0 psi <<<"));
        assert!(text.contains("UNSAFE: MAWP (244.0 psi) < Design Pressure (280 psi)"));
        assert!(text.contains("de-rated to 244 psi"));
        assert!(text.contains("Minimum thickness required for 280 psi: 0.9195 in"));
        assert!(text.contains(">>> HEAD MAWP = 155.6 psi <<<"));
        assert!(text.contains(">>> GOVERNING MAWP = 155.6 psi <<<"));
    }
}
