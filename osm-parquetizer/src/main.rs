use clap::{Parser, Subcommand};
use osm_parquetizer::{
    config::ConversionConfiguration,
    model::{osm::OsmSource, CliError},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct ParquetizerAppArguments {
    #[command(subcommand)]
    app: App,
}

#[derive(Subcommand)]
pub enum App {
    Pbf {
        #[arg(long, help = "path to the .pbf file to be parquetized")]
        pbf_file: Option<String>,
        #[arg(long, help = "directory where the Parquet files are written")]
        output_directory: Option<String>,
        #[arg(long, help = "continent of the .pbf extract, used to derive default paths")]
        continent: Option<String>,
        #[arg(long, help = "country of the .pbf extract, used to derive default paths")]
        country: Option<String>,
        #[arg(long, help = "country region of the .pbf extract, used to derive default paths")]
        country_region: Option<String>,
        #[arg(long, help = "decode parallelism hint passed to the reader")]
        pbf_threads: Option<usize>,
        #[arg(long, help = "if present the metadata columns are not parquetized")]
        exclude_metadata: bool,
        #[arg(long, help = "if present the nodes are not parquetized")]
        no_nodes: bool,
        #[arg(long, help = "if present the ways are not parquetized")]
        no_ways: bool,
        #[arg(long, help = "if present the relations are not parquetized")]
        no_relations: bool,
        #[arg(long, help = "path to file with conversion parameters")]
        configuration_file: Option<String>,
    },
}

pub fn run(app: &App) -> Result<(), CliError> {
    env_logger::init();
    match app {
        App::Pbf {
            pbf_file,
            output_directory,
            continent,
            country,
            country_region,
            pbf_threads,
            exclude_metadata,
            no_nodes,
            no_ways,
            no_relations,
            configuration_file,
        } => {
            let mut conf = match configuration_file {
                None => Ok(ConversionConfiguration::default()),
                Some(f) => {
                    log::info!("reading conversion configuration from {f}");
                    ConversionConfiguration::try_from(f)
                }
            }?;
            // command-line switches extend whatever the file provided
            if *exclude_metadata {
                conf.exclude_metadata = true;
            }
            if *no_nodes {
                conf.no_nodes = true;
            }
            if *no_ways {
                conf.no_ways = true;
            }
            if *no_relations {
                conf.no_relations = true;
            }
            if let Some(threads) = pbf_threads {
                conf.pbf_threads = *threads;
            }
            if conf.pbf_threads > 1 {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(conf.pbf_threads)
                    .build_global()
                    .map_err(|e| {
                        CliError::ConfigurationError(format!(
                            "failure sizing decode thread pool: {e}"
                        ))
                    })?;
            }

            let source = OsmSource::Pbf {
                pbf_filepath: pbf_file.clone(),
                output_directory: output_directory.clone(),
                continent: continent.clone(),
                country: country.clone(),
                country_region: country_region.clone(),
                configuration: conf,
            };
            let total = source.parquetize()?;
            eprintln!("finished. {total} elements processed");
            Ok(())
        }
    }
}

fn main() {
    let args = ParquetizerAppArguments::parse();
    match run(&args.app) {
        Ok(_) => {}
        Err(e) => {
            println!("{e}");
            std::process::exit(1);
        }
    }
}
