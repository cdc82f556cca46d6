pub mod crawl;
pub mod error;
pub mod lines;
pub mod output;
pub mod tree;

pub use error::CoreError;
pub use tree::VirtualTree;

pub const BANNER: &str = r#"
     _ _       _
 ___(_) |_ ___| |_ _ __ ___  ___
/ __| | __/ _ \ __| '__/ _ \/ _ \
\__ \ | ||  __/ |_| | |  __/  __/
|___/_|\__\___|\__|_|  \___|\___|
"#;

pub fn print_banner() {
    println!("{}", BANNER);
    println!("  v{} - map the directory space of a site\n", env!("CARGO_PKG_VERSION"));
}
