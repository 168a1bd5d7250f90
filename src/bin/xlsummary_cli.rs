//! CLI tool for xlsummary - downloads, previews and renders year summary sheets
//!
//! Usage:
//!   xlsummary_cli download 2025A --group <id> --out ./sheets
//!   xlsummary_cli preview 2025A --sheet 1 -o preview.html
//!   xlsummary_cli render summary.xlsx --json

#![allow(clippy::exit)]

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::main();
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs;
    use std::io::{self, Write};
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use clap::{Args, Parser, Subcommand};
    use tracing_subscriber::EnvFilter;

    use xlsummary::client::{
        parse_timeout_secs, ClientConfig, DirectorySaver, FileTokenStore, NoToken,
        ReqwestTransport, StaticToken, SummarySheetClient, TokenProvider,
    };
    use xlsummary::parser::{self, SpreadsheetParser};
    use xlsummary::render::{render_preview, RenderOptions};
    use xlsummary::viewer::{PreviewController, PreviewState};
    use xlsummary::SummaryError;

    #[derive(Parser)]
    #[command(
        name = "xlsummary_cli",
        version,
        about = "Fetch, save and preview year summary sheets"
    )]
    struct Cli {
        #[command(subcommand)]
        command: Command,
    }

    #[derive(Subcommand)]
    enum Command {
        /// Download the generated sheet without parsing it
        Download {
            academic_year_id: String,
            #[command(flatten)]
            remote: RemoteArgs,
            /// Directory to save into
            #[arg(long, default_value = ".")]
            out: PathBuf,
        },
        /// Fetch, parse and render the sheet as HTML
        Preview {
            academic_year_id: String,
            #[command(flatten)]
            remote: RemoteArgs,
            #[command(flatten)]
            view: ViewArgs,
        },
        /// Parse a local workbook and render it
        Render {
            input: PathBuf,
            #[arg(long, default_value_t = 0)]
            sheet: usize,
            /// Emit the parsed document as JSON instead of HTML
            #[arg(long)]
            json: bool,
            #[arg(short, long)]
            output: Option<PathBuf>,
        },
    }

    #[derive(Args)]
    struct RemoteArgs {
        /// Student group; defaults to the configured group
        #[arg(long)]
        group: Option<String>,
        /// Overrides XLSUMMARY_PROXY_BASE
        #[arg(long)]
        proxy_base: Option<String>,
        /// Overrides XLSUMMARY_TIMEOUT_SECS; fractional seconds allowed
        #[arg(long, value_parser = parse_timeout_secs)]
        timeout_secs: Option<Duration>,
        /// Overrides XLSUMMARY_DEFAULT_GROUP
        #[arg(long)]
        default_group: Option<String>,
        #[arg(long, conflicts_with = "token_file")]
        token: Option<String>,
        /// File holding the bearer token, re-read on every request
        #[arg(long)]
        token_file: Option<PathBuf>,
    }

    #[derive(Args)]
    struct ViewArgs {
        #[arg(long, default_value_t = 0)]
        sheet: usize,
        #[arg(long)]
        expanded: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    }

    impl RemoteArgs {
        fn config(&self) -> Result<ClientConfig, SummaryError> {
            let mut config = ClientConfig::from_env()?;
            if let Some(base) = &self.proxy_base {
                config = config.with_proxy_base(base.as_str());
            }
            if let Some(timeout) = self.timeout_secs {
                config = config.with_timeout(timeout);
            }
            if let Some(group) = &self.default_group {
                config = config.with_default_group(group.as_str());
            }
            Ok(config)
        }

        fn tokens(&self) -> Box<dyn TokenProvider> {
            match (&self.token, &self.token_file) {
                (Some(token), _) => Box::new(StaticToken::new(token.as_str())),
                (None, Some(path)) => Box::new(FileTokenStore::new(path)),
                (None, None) => Box::new(NoToken),
            }
        }
    }

    fn init_tracing() {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(io::stderr)
            .init();
    }

    fn fail(message: impl std::fmt::Display) -> ! {
        eprintln!("Error: {message}");
        std::process::exit(1);
    }

    fn write_output(path: Option<&Path>, contents: &str) {
        match path {
            Some(path) => {
                if let Err(e) = fs::write(path, contents) {
                    fail(format!("writing {}: {e}", path.display()));
                }
                eprintln!("Written: {}", path.display());
            }
            None => {
                let mut stdout = io::stdout().lock();
                if let Err(e) = stdout
                    .write_all(contents.as_bytes())
                    .and_then(|()| stdout.write_all(b"\n"))
                {
                    fail(e);
                }
            }
        }
    }

    pub fn main() {
        init_tracing();
        let cli = Cli::parse();

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap_or_else(|e| fail(e));

        match cli.command {
            Command::Download {
                academic_year_id,
                remote,
                out,
            } => {
                let config = remote.config().unwrap_or_else(|e| fail(e));
                let client = SummarySheetClient::new(
                    config,
                    ReqwestTransport::new(),
                    remote.tokens(),
                    DirectorySaver::new(&out),
                );
                let result = runtime.block_on(
                    client.request_summary_sheet(&academic_year_id, remote.group.as_deref()),
                );
                if !result.success {
                    fail(result.message.unwrap_or_default());
                }
                eprintln!(
                    "Saved {} ({} bytes) to {}",
                    result.file_name.unwrap_or_default(),
                    result.file_size.unwrap_or_default(),
                    out.display()
                );
            }
            Command::Preview {
                academic_year_id,
                remote,
                view,
            } => {
                let config = remote.config().unwrap_or_else(|e| fail(e));
                let client = SummarySheetClient::new(
                    config,
                    ReqwestTransport::new(),
                    remote.tokens(),
                    DirectorySaver::new("."),
                );
                let controller = PreviewController::new(client, SpreadsheetParser::new());
                runtime.block_on(controller.load(&academic_year_id, remote.group.as_deref()));
                if let PreviewState::Failed { message } = controller.state() {
                    fail(message);
                }
                controller.select_sheet(view.sheet);
                if view.expanded {
                    controller.toggle_expanded();
                }
                let html = controller.render().unwrap_or_default();
                write_output(view.output.as_deref(), &html);
            }
            Command::Render {
                input,
                sheet,
                json,
                output,
            } => {
                let data = fs::read(&input)
                    .unwrap_or_else(|e| fail(format!("reading {}: {e}", input.display())));
                let filename = input
                    .file_name()
                    .map_or_else(|| input.display().to_string(), |n| n.to_string_lossy().into_owned());
                let doc = parser::parse(&data, &filename).unwrap_or_else(|e| fail(e));
                let contents = if json {
                    doc.to_json().unwrap_or_else(|e| fail(e))
                } else {
                    render_preview(
                        &doc,
                        &RenderOptions {
                            sheet_index: sheet,
                            ..RenderOptions::default()
                        },
                    )
                };
                write_output(output.as_deref(), &contents);
            }
        }
    }

}
