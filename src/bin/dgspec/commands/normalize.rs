//! `dgspec normalize` command

use anyhow::Result;

use crate::cli::NormalizeArgs;
use dgspec::ops::{normalize, NormalizeOptions};

pub fn execute(args: NormalizeArgs) -> Result<()> {
    let (config, _) = super::current_config()?;

    let opts = NormalizeOptions {
        load: super::load_options(&args.read, &config),
        input: args.file,
        output: args.output,
        project: args.project,
    };
    let hash = normalize(&opts)?;

    if config.output.hash {
        println!("{}", hash);
    }
    Ok(())
}
