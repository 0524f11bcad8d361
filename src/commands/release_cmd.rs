use crate::cli::ReleaseAction;
use crate::home::{Home, HomePath};
use crate::release::{default_bin_dir, Formula, Installer};
use crate::ui;
use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

use super::runtime;

pub fn execute(home: &Home, action: ReleaseAction) -> Result<()> {
    match action {
        ReleaseAction::Info => info(),
        ReleaseAction::Check { formula } => check(formula.as_deref()),
        ReleaseAction::Formula { formula } => {
            print!("{}", load(formula.as_deref())?.to_homebrew());
            Ok(())
        }
        ReleaseAction::Install { bin_dir, formula } => {
            install(home, bin_dir.as_deref(), formula.as_deref())
        }
    }
}

fn load(path: Option<&Path>) -> Result<Formula> {
    match path {
        Some(path) => Formula::load(path),
        None => Ok(Formula::ghostie()),
    }
}

fn info() -> Result<()> {
    let formula = Formula::ghostie();
    ui::info(format!(
        "{} {} - {}\nHomepage: {}\nLicense: {}\nDepends on: {}",
        formula.name,
        formula.version,
        formula.desc,
        formula.homepage,
        formula.license,
        formula.depends_on.join(", ")
    ));

    match formula.asset_for_host() {
        Ok(asset) => ui::info(format!(
            "Archive for {}: {}\nsha256: {}",
            asset.platform, asset.url, asset.sha256
        )),
        Err(err) => ui::warn(err),
    }
    Ok(())
}

fn check(path: Option<&Path>) -> Result<()> {
    let formula = load(path)?;
    let issues = formula.validate();

    if issues.is_empty() {
        let platforms: Vec<&str> = formula
            .assets
            .iter()
            .map(|asset| asset.platform.as_str())
            .collect();
        ui::success(
            "Valid",
            format!(
                "{} {} ({})",
                formula.name,
                formula.version,
                platforms.join(", ")
            ),
        );
        return Ok(());
    }

    for issue in &issues {
        ui::error(issue);
    }
    bail!("{} problem(s) found in release metadata", issues.len());
}

fn install(home: &Home, bin_dir: Option<&str>, path: Option<&Path>) -> Result<()> {
    let formula = load(path)?;
    let asset = formula.asset_for_host()?;
    let bin_dir = match bin_dir {
        Some(dir) => PathBuf::from(shellexpand::tilde(dir).into_owned()),
        None => default_bin_dir()?,
    };

    let installer = Installer::new(home.path(HomePath::Releases))?;
    let progress = ui::Progress::new(
        "Installing",
        format!("{} {} for {}", formula.name, formula.version, asset.platform),
    );

    match runtime()?.block_on(installer.install(&formula, asset, &bin_dir)) {
        Ok(target) => {
            progress.success("Installed");
            ui::info(target.display());
            if !on_path(&bin_dir) {
                ui::warn(format!("{} is not on your PATH", bin_dir.display()));
            }
            println!("{}", formula.caveats());
            Ok(())
        }
        Err(err) => {
            progress.fail(format!("{err:#}"));
            Err(err)
        }
    }
}

fn on_path(dir: &Path) -> bool {
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|entry| entry == dir))
        .unwrap_or(false)
}
