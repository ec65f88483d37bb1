use std::process::Command;

use anyhow::{Context, Result};

const PACKAGE: &str = "sundry-common";

/// Feature tiers checked with `--no-default-features`, so each tier proves
/// it pulls in everything it needs on its own.
const FEATURE_COMBINATIONS: &[&[&str]] = &[
    &[], // bare crate
    &["foundation"],
    &["observability"],
    &["runtime"],
    &["test-utils"],
];

/// Check that all required feature combinations compile successfully.
pub fn test_feature_matrix() -> Result<()> {
    println!("Testing {} {PACKAGE} feature combinations...", FEATURE_COMBINATIONS.len());

    for (index, features) in FEATURE_COMBINATIONS.iter().enumerate() {
        let joined = features.join(",");
        let display_label = if features.is_empty() { "none".to_string() } else { joined.clone() };

        println!(
            "\n[{}/{}] cargo check -p {PACKAGE} --no-default-features --features '{joined}'",
            index + 1,
            FEATURE_COMBINATIONS.len(),
        );

        let mut command = Command::new("cargo");
        command.args(["check", "-p", PACKAGE, "--no-default-features"]);

        if !features.is_empty() {
            command.arg("--features").arg(joined.as_str());
        }

        let status = command
            .status()
            .with_context(|| format!("Failed to run cargo check for '{display_label}'"))?;

        if !status.success() {
            anyhow::bail!("Feature combination '{display_label}' failed to compile");
        }

        println!("✅ Features '{display_label}' compiled successfully");
    }

    println!("\n✅ All {} feature combinations compile successfully!", FEATURE_COMBINATIONS.len());

    Ok(())
}
