use clap::{arg, command};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("sitetree")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitetree")
        .about("Crawl a site for the directory paths it exposes and lay them out as a tree")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(arg!(--"debug" "Enable debug logging on stderr").required(false))
        .subcommand_required(true)
        .subcommand(
            command!("tree")
                .about("Build a virtual directory tree from a file of paths, one per line")
                .arg(
                    arg!(-i --"input" <PATH>)
                        .required(true)
                        .help("Input file containing relative paths"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Output file to save the tree structure"),
                )
                .arg(
                    arg!(-v --"verbose")
                        .required(false)
                        .help("Print the tree structure to the console")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Tree format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    arg!(--"sorted")
                        .required(false)
                        .help("Sort input paths before building (default: keep file order)")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl a site from URL, following same-origin links, and write the \
                discovered directories and their tree.",
                )
                .arg(arg!(<URL>).required(true).help("The URL to start crawling from"))
                .arg(
                    arg!(-d --"depth" <DEPTH>)
                        .required(false)
                        .help("Maximum crawl depth; the start URL is depth 1")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("3"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("The number of async workers pulling from the crawl stack")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1"),
                )
                .arg(
                    arg!(-o --"output-dir" <DIR>)
                        .required(false)
                        .help("Directory to write dirs_<name>.txt and tree_<name>.txt into")
                        .default_value("."),
                )
                .arg(
                    arg!(--"deny" <SUBSTR>)
                        .required(false)
                        .help("Reject extracted paths containing SUBSTR (repeatable)")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(--"denylist-file" <PATH>)
                        .required(false)
                        .help("Newline-delimited file of substrings to reject"),
                )
                .arg(
                    arg!(--"no-default-denylist")
                        .required(false)
                        .help("Do not apply the built-in noise denylist")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}
