use std::fs;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::Shell;

// cli.rs depends only on clap and clap_complete, both build-dependencies.
#[path = "src/cli.rs"]
mod cli;

fn main() {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let Some(out_dir) = std::env::var_os("OUT_DIR").map(PathBuf::from) else {
        panic!("OUT_DIR not set by Cargo");
    };

    let mut cmd = cli::Cli::command();

    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).unwrap_or_else(|e| panic!("creating {}: {e}", man_dir.display()));
    write_manpages(&cmd, "ibmtf", &man_dir);

    let completions_dir = out_dir.join("completions");
    fs::create_dir_all(&completions_dir)
        .unwrap_or_else(|e| panic!("creating {}: {e}", completions_dir.display()));
    for shell in [Shell::Bash, Shell::Zsh, Shell::Fish] {
        clap_complete::generate_to(shell, &mut cmd, "ibmtf", &completions_dir)
            .unwrap_or_else(|e| panic!("generating {shell} completions: {e}"));
    }
}

/// One page per visible command, named `ibmtf-<sub>-<subsub>.1`.
fn write_manpages(cmd: &clap::Command, name: &str, dir: &Path) {
    let page = dir.join(format!("{name}.1"));
    let mut buf = Vec::new();
    clap_mangen::Man::new(cmd.clone().name(name.to_owned()))
        .render(&mut buf)
        .unwrap_or_else(|e| panic!("rendering man page for `{name}`: {e}"));
    fs::write(&page, buf).unwrap_or_else(|e| panic!("writing {}: {e}", page.display()));

    for sub in cmd.get_subcommands().filter(|s| !s.is_hide_set()) {
        write_manpages(sub, &format!("{name}-{}", sub.get_name()), dir);
    }
}
