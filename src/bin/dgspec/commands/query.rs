//! `dgspec closure`, `parents`, `roots`, `hash` and `sort` commands

use anyhow::Result;

use crate::cli::{DocumentArgs, ProjectArgs, ReadOptions};
use dgspec::ops;
use dgspec::DependencyGraphSpec;

fn load(file: &std::path::Path, read: &ReadOptions) -> Result<DependencyGraphSpec> {
    let (config, _) = super::current_config()?;
    ops::load_graph(file, super::load_options(read, &config))
}

fn print_names(names: &[String]) {
    for name in names {
        println!("{}", name);
    }
}

pub fn closure(args: ProjectArgs) -> Result<()> {
    let graph = load(&args.file, &args.read)?;
    print_names(&ops::closure_names(&graph, &args.project)?);
    Ok(())
}

pub fn parents(args: ProjectArgs) -> Result<()> {
    let graph = load(&args.file, &args.read)?;
    print_names(&ops::parent_names(&graph, &args.project)?);
    Ok(())
}

pub fn roots(args: DocumentArgs) -> Result<()> {
    let graph = load(&args.file, &args.read)?;
    print_names(&ops::root_names(&graph));
    Ok(())
}

pub fn hash(args: DocumentArgs) -> Result<()> {
    let graph = load(&args.file, &args.read)?;
    println!("{}", graph.hash());
    Ok(())
}

pub fn sort(args: DocumentArgs) -> Result<()> {
    let graph = load(&args.file, &args.read)?;
    print_names(&ops::sorted_names(&graph));
    Ok(())
}
