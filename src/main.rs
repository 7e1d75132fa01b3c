use std::path::Path;

use anyhow::{self, format_err, Context};
use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::append::Append;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;

use tensorgrab::interfaces::cli::{log_heading, Cli};
use tensorgrab::interfaces::input::Input;
use tensorgrab::interfaces::InputHandle;
use tensorgrab::io::{read_tensorgrab_yaml, write_tensorgrab_yaml};

/// Sets up `log4rs` with the `tensorgrab-output` logger writing either to `<output>.out` or to
/// standard output, and the root logger writing diagnostics to standard error.
fn setup_logger(output: Option<&Path>, verbose: u8) -> Result<(), anyhow::Error> {
    let output_appender: Box<dyn Append> = if let Some(output) = output {
        Box::new(
            FileAppender::builder()
                .encoder(Box::new(PatternEncoder::new("{m}{n}")))
                .append(false)
                .build(output.with_extension("out"))
                .with_context(|| {
                    format!("Unable to create the output file for `{}`", output.display())
                })?,
        )
    } else {
        Box::new(
            ConsoleAppender::builder()
                .encoder(Box::new(PatternEncoder::new("{m}{n}")))
                .build(),
        )
    };
    let diagnostic_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {h({l:<5})} {t} - {m}{n}",
        )))
        .build();
    let root_level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let config = Config::builder()
        .appender(Appender::builder().build("output", output_appender))
        .appender(Appender::builder().build("diagnostic", Box::new(diagnostic_appender)))
        .logger(
            Logger::builder()
                .appender("output")
                .additive(false)
                .build("tensorgrab-output", LevelFilter::Info),
        )
        .build(Root::builder().appender("diagnostic").build(root_level))
        .map_err(|err| format_err!(err))?;
    log4rs::init_config(config).map_err(|err| format_err!(err))?;
    Ok(())
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    if let Some(template) = cli.template.as_ref() {
        write_tensorgrab_yaml(template, &Input::default()).with_context(|| {
            format!(
                "Unable to write a template input file to `{}`",
                template.display()
            )
        })?;
        return Ok(());
    }

    setup_logger(cli.output.as_deref(), cli.verbose)?;
    log_heading();

    let config = cli
        .config
        .as_ref()
        .ok_or_else(|| format_err!("No input file specified. Use `--config` to provide one."))?;
    let inp = read_tensorgrab_yaml::<Input, _>(config)
        .with_context(|| format!("Unable to read input file `{}`", config.display()))?;
    inp.handle().map_err(|err| {
        log::error!("{err:#}");
        log::error!(target: "tensorgrab-output", "{err:#}");
        err
    })
}
