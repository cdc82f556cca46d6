use colored::Colorize;
use sitetree::commands::command_argument_builder;
use sitetree::handlers::{handle_crawl, handle_tree, init_tracing};
use sitetree_core::print_banner;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    init_tracing(chosen_command.get_flag("debug"));

    let outcome = match chosen_command.subcommand() {
        Some(("tree", primary_command)) => handle_tree(primary_command, quiet),
        Some(("crawl", primary_command)) => {
            // Show banner unless --quiet flag is set
            if !quiet {
                print_banner();
            }
            handle_crawl(primary_command, quiet).await
        }
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = outcome {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
