use clap::Parser;
use miette::Result;
use tolstack::cli::commands::{self, Context};
use tolstack::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
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
    tolstack::logging::init(cli.global.verbose);

    let ctx = Context::from_global(&cli.global)?;

    match cli.command {
        Commands::New(args) => commands::new::run(args, &ctx),
        Commands::Show => commands::show::run(&ctx),
        Commands::Analyze(args) => commands::analyze::run(args, &ctx),
        Commands::Pareto => commands::pareto::run(&ctx),
        Commands::Row(cmd) => commands::row::run(cmd, &ctx),
        Commands::Setup(cmd) => commands::setup::run(cmd, &ctx),
        Commands::Tol(args) => commands::tol::run(args, &ctx),
        Commands::Import(args) => commands::transfer::run_import(args, &ctx),
        Commands::Export(args) => commands::transfer::run_export(args, &ctx),
        Commands::Report(args) => commands::report::run(args, &ctx),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
