use clap::Parser;
use miette::Result;
use orderdesk::cli::{commands, Cli, Commands, GlobalOpts};
use orderdesk::core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head` or `grep -q` panics on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(&global);

    match cli.command {
        Commands::Init(args) => commands::init::run(args, &global),
        Commands::List(args) => commands::list::run(args, &global),
        Commands::Fields(args) => commands::fields::run(args, &global),
        Commands::Add(args) => commands::add::run(args, &global),
        Commands::Edit(args) => commands::edit::run(args, &global),
        Commands::Delete(args) => commands::delete::run(args, &global),
        Commands::View(cmd) => commands::view::run(cmd, &global),
        Commands::Export(args) => commands::export::run(args, &global),
        Commands::Import(args) => commands::import::run(args, &global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

/// Log to stderr. `--verbose` wins, then `RUST_LOG`, then the configured
/// filter, then warnings only.
fn init_tracing(global: &GlobalOpts) {
    let filter = if global.verbose {
        EnvFilter::new("orderdesk=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let configured = Config::load().log.unwrap_or_else(|| "warn".to_string());
            EnvFilter::try_new(&configured).unwrap_or_else(|_| EnvFilter::new("warn"))
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
