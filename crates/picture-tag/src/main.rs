use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, Command};
use picture_rendition::{InMemoryCatalog, SimulatedRenditionService};
use picture_tag::{init_tracing, parse_size, PictureConfig, PictureRenderer};
use std::path::PathBuf;
use std::sync::Arc;

fn cli() -> Command {
    Command::new("picture-tag")
        .version(picture_tag::VERSION)
        .about("Render responsive <picture> markup from picture tag directives")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("render")
                .about("Render a tag against a JSON image catalog and the simulated backend")
                .arg(
                    Arg::new("catalog")
                        .long("catalog")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON object mapping image expressions to images"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML renderer configuration"),
                )
                .arg(
                    Arg::new("json-logs")
                        .long("json-logs")
                        .action(ArgAction::SetTrue)
                        .help("Emit logs as JSON"),
                )
                .arg(
                    Arg::new("image")
                        .required(true)
                        .help("Image expression, e.g. page.photo"),
                )
                .arg(
                    Arg::new("directives")
                        .num_args(0..)
                        .help("Filter specs, formats, size-... and lazy"),
                ),
        )
        .subcommand(
            Command::new("check-size")
                .about("Print the sizes value for a size-... directive")
                .arg(Arg::new("token").required(true)),
        )
}

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("render", args)) => {
            init_tracing(args.get_flag("json-logs")).context("installing tracing subscriber")?;

            let catalog_path = args
                .get_one::<PathBuf>("catalog")
                .context("--catalog is required")?;
            let raw = std::fs::read_to_string(catalog_path)
                .with_context(|| format!("reading catalog {}", catalog_path.display()))?;
            let catalog = InMemoryCatalog::from_json(&raw)
                .with_context(|| format!("parsing catalog {}", catalog_path.display()))?;

            let tokens: Vec<String> = args
                .get_one::<String>("image")
                .into_iter()
                .chain(args.get_many::<String>("directives").into_iter().flatten())
                .cloned()
                .collect();

            let service = Arc::new(SimulatedRenditionService::new());
            let renderer = match args.get_one::<PathBuf>("config") {
                Some(path) => PictureRenderer::load(service, path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => PictureRenderer::from_config(service, PictureConfig::default()),
            };
            let markup = renderer.render_tag(&tokens, &catalog)?;
            if markup.is_empty() {
                tracing::warn!(tokens = ?tokens, "tag rendered no markup");
            }
            println!("{markup}");
        }
        Some(("check-size", args)) => {
            let token = args.get_one::<String>("token").context("token is required")?;
            println!("{}", parse_size(token));
        }
        _ => {}
    }

    Ok(())
}
