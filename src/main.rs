//! Binary entry point for the `cmi` command-line tool.
//!
//! Loads the binding into an in-process host exactly as an embedding
//! environment would, then calls `charm.cmi.num_cores()` and prints the
//! result on stdout.
//!
//! Flags override the `FORCECPUCOUNT` / `CHARM_CMI_CORE_SOURCE` environment
//! settings; `-v` / `-q` adjust the display level set by
//! `CHARM_CMI_DISPLAY_LEVEL`.

use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::Parser;

use charm::config::{CoreSource, QueryConfig, NUM_CORES_PATH};
use charm::display::{display_level, init_display_level, set_display_level};
use charm::registry::{InProcessHost, Value};
use charm::topology::HostTopology;

#[derive(Debug, Parser)]
#[command(
    name = "cmi",
    version,
    about = "Print the number of cores on the local node."
)]
struct Args {
    /// Probe to query: online, available or physical
    #[arg(short, long)]
    source: Option<CoreSource>,

    /// Report this count instead of probing
    #[arg(short, long, value_name = "N")]
    force: Option<usize>,

    /// Print the help text attached to num_cores and exit
    #[arg(long)]
    doc: bool,

    /// Increase verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress warnings
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn query_config(args: &Args) -> anyhow::Result<QueryConfig> {
    let mut config = QueryConfig::from_env();
    if let Some(source) = args.source {
        config = config.with_source(source);
    }
    if let Some(force) = args.force {
        if force == 0 {
            return Err(anyhow!("bad usage: --force: core count must be > 0"));
        }
        config = config.with_forced(Some(force));
    }
    Ok(config)
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = query_config(&args)?;
    charm::displaylevel!(3, "*** cmi v{} ({} cores) ***\n", charm::version_string(), config.source);

    let (host, registration) =
        InProcessHost::with_capabilities(Arc::new(HostTopology::new(config)));
    if !registration.is_registered() {
        return Err(anyhow!("{} is not available", NUM_CORES_PATH));
    }

    if args.doc {
        charm::displayout!("{}\n", host.doc(NUM_CORES_PATH)?);
        return Ok(());
    }

    match host
        .call(NUM_CORES_PATH, &[])
        .with_context(|| format!("{NUM_CORES_PATH}() failed"))?
    {
        Value::Int(count) => charm::displayout!("{}\n", count),
        other => return Err(anyhow!("unexpected result from {NUM_CORES_PATH}(): {other:?}")),
    }
    Ok(())
}

fn main() {
    // Usage errors share exit code 1 with query errors; help and version exit 0.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    init_display_level();
    if args.quiet {
        set_display_level(1);
    } else if args.verbose > 0 {
        set_display_level(display_level() + u32::from(args.verbose));
    }

    if let Err(err) = run(args) {
        if display_level() >= 1 {
            charm::display!("cmi: {err:#}\n");
        }
        std::process::exit(1);
    }
}
