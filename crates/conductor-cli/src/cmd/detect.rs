use crate::output::{print_json, print_table};
use conductor_core::Conductor;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let detection = Conductor::new(root).detect_project_kind();

    if json {
        return print_json(&detection);
    }

    println!("Project Type: {}", detection.kind);
    println!();
    let rows: Vec<Vec<String>> = detection
        .indicators
        .iter()
        .map(|i| {
            vec![
                i.path.to_string(),
                if i.present { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    print_table(&["INDICATOR", "PRESENT"], rows);
    Ok(())
}
