use anyhow::Result;
use clap::{Arg, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::io;
use std::path::PathBuf;

use sentivote_cli::commands::{features, graphs, learning, report, train};
use sentivote_cli::input::RunSettings;

fn corpus_arg() -> Arg {
    Arg::new("corpus")
        .short('c')
        .long("corpus")
        .help("Review corpus root with one sub-directory of *.txt files per label")
        .required(true)
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::DirPath)
}

fn vocabulary_arg() -> Arg {
    Arg::new("vocabulary_size")
        .short('n')
        .long("vocabulary-size")
        .help("Number of most frequent words used as features [default: 3000]")
        .value_parser(clap::value_parser!(usize))
}

fn seed_arg() -> Arg {
    Arg::new("seed")
        .long("seed")
        .help("Seed of the corpus shuffle [default: 42]")
        .value_parser(clap::value_parser!(u64))
}

/// Arguments of every subcommand that builds the ensemble.
fn ensemble_args() -> Vec<Arg> {
    vec![
        corpus_arg(),
        vocabulary_arg(),
        seed_arg(),
        Arg::new("ensemble")
            .short('e')
            .long("ensemble")
            .help(
                "Ensemble JSON file. Defaults to voting.json in the working directory, \
                 or the built-in ensemble when that file does not exist.",
            )
            .value_parser(clap::value_parser!(PathBuf))
            .value_hint(ValueHint::FilePath),
        Arg::new("only")
            .long("only")
            .help("Restrict the ensemble to the named sub-classifiers")
            .num_args(1..)
            .value_parser(clap::builder::NonEmptyStringValueParser::new()),
    ]
}

fn train_size_arg() -> Arg {
    Arg::new("train_size")
        .short('k')
        .long("train-size")
        .help("Number of leading samples used for training; the rest are held out [default: 1900]")
        .value_parser(clap::value_parser!(usize))
}

fn output_arg(default: &'static str) -> Arg {
    Arg::new("output_file")
        .short('o')
        .long("output")
        .help(format!("HTML file to write [default: {}]", default))
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
}

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("SENTIVOTE_LOG", "error,sentivote=info"))
        .init();

    let matches = Command::new("sentivote")
        .version(clap::crate_version!())
        .about("\u{1F3AC} sentivote - voting ensemble sentiment classifier for movie reviews")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("features")
                .about("List the vocabulary used as features and exit")
                .arg(corpus_arg())
                .arg(vocabulary_arg())
                .arg(seed_arg()),
        )
        .subcommand(
            Command::new("train")
                .about("Build and train the voting ensemble, then report its accuracy")
                .args(ensemble_args())
                .arg(train_size_arg()),
        )
        .subcommand(
            Command::new("report")
                .about("Print classifier and sub-classifier metrics on the held-out samples")
                .args(ensemble_args())
                .arg(train_size_arg()),
        )
        .subcommand(
            Command::new("graphs")
                .about("Write confusion matrices and ROC curves to an HTML page")
                .args(ensemble_args())
                .arg(train_size_arg())
                .arg(output_arg(graphs::DEFAULT_OUTPUT))
                .arg(
                    Arg::new("positive")
                        .long("positive")
                        .help("Label treated as positive for ROC curves [default: last label]")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new()),
                ),
        )
        .subcommand(
            Command::new("learning")
                .about("Write cross-validated learning curves of every sub-classifier to an HTML page")
                .args(ensemble_args())
                .arg(output_arg(learning::DEFAULT_OUTPUT))
                .arg(
                    Arg::new("folds")
                        .long("folds")
                        .help("Number of cross-validation folds [default: 5]")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("points")
                        .long("points")
                        .help("Number of training sizes on the curve [default: 10]")
                        .value_parser(clap::value_parser!(usize)),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    let Some((name, sub_matches)) = matches.subcommand() else {
        unreachable!("Subcommand is required by CLI configuration")
    };

    match run_subcommand(name, sub_matches) {
        Ok(()) => Ok(()),
        Err(e) => {
            log::error!("{} failed: {:#}", name, e);
            std::process::exit(1)
        }
    }
}

fn run_subcommand(name: &str, matches: &ArgMatches) -> Result<()> {
    let settings = RunSettings::from_arguments(matches)?;
    let mut stdout = io::stdout().lock();

    match name {
        "features" => features::run(&settings, &mut stdout),
        "train" => train::run(&settings, &mut stdout),
        "report" => report::run(&settings, &mut stdout),
        "graphs" => {
            let path = graphs::run(&settings)?;
            log::info!("[sentivote::graphs] Wrote {:?}", path);
            Ok(())
        }
        "learning" => {
            let path = learning::run(&settings)?;
            log::info!("[sentivote::learning] Wrote {:?}", path);
            Ok(())
        }
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}
