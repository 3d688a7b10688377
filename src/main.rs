use clap::Parser;
use grounded_qa::cli::commands::{
    cmd_generate_cases, cmd_generate_script, cmd_ingest, cmd_summary, cmd_validate, trace_path,
};
use grounded_qa::cli::config::{
    Cli, Commands, load_config, resolve_data_dir, resolve_llm_settings, resolve_script_settings,
};
use grounded_qa::knowledge::store::FileStore;
use grounded_qa::trace::logger::TraceLogger;

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref());
    let store = FileStore::new(resolve_data_dir(&config, cli.data_dir.as_deref()));
    let tracer = TraceLogger::new(&trace_path(&store));

    let result = match cli.command {
        Commands::Ingest { files } => cmd_ingest(&store, &files, &tracer),
        Commands::GenerateCases {
            backend,
            endpoint,
            model,
        } => {
            let settings = resolve_llm_settings(
                &config.llm,
                backend.as_deref(),
                endpoint.as_deref(),
                model.as_deref(),
            );
            cmd_generate_cases(&store, &settings, &tracer)
        }
        Commands::Validate => cmd_validate(&store, &tracer),
        Commands::GenerateScript {
            ids,
            all,
            format,
            output,
            headless,
            wait_seconds,
        } => {
            let settings = resolve_script_settings(
                &config.script,
                format.as_deref(),
                output.as_deref(),
                headless,
                wait_seconds,
            );
            cmd_generate_script(&store, &ids, all, &settings, &tracer)
        }
        Commands::Summary => cmd_summary(&store),
    };

    match result {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("error: {}", e);
            if let Some(raw) = e.raw_output() {
                eprintln!("--- raw LLM output ---\n{}", raw);
            }
            std::process::exit(1);
        }
    }
}
