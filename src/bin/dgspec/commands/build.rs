//! `dgspec build` command

use anyhow::{bail, Result};

use crate::cli::BuildArgs;
use dgspec::ops::{build_restore_file, BuildFileOptions};

pub fn execute(args: BuildArgs) -> Result<()> {
    let (config, cwd) = super::current_config()?;

    let opts = BuildFileOptions {
        output: args.output.unwrap_or_else(|| config.output_file(&cwd)),
        comparer: super::comparer(args.path_case, &config),
        hash: args.hash || config.output.hash,
        items: args.items,
    };

    let report = build_restore_file(&opts)?;
    if report.errors > 0 {
        bail!("restore evaluation reported {} error(s)", report.errors);
    }

    eprintln!(
        "    Finished {} project(s), {} restore root(s) -> {}",
        report.projects,
        report.restore,
        report.output.display()
    );
    if let Some(hash) = report.hash {
        println!("{}", hash);
    }

    Ok(())
}
