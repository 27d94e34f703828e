use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "lazymodal", version, about = "Stacked modal dialogs in the terminal")]
pub struct Args {
    /// Theme name (e.g., "Catppuccin Latte"), overrides the config file
    #[arg(short, long)]
    pub theme: Option<String>,

    /// Do not lock page scrolling while modals are open
    #[arg(long)]
    pub no_scroll_lock: bool,

    /// Keep closed modals mounted so reopening reuses them
    #[arg(long)]
    pub keep_on_close: bool,

    /// Config file to load instead of the default location
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["lazymodal"]);
        assert!(args.theme.is_none());
        assert!(!args.no_scroll_lock);
        assert!(!args.keep_on_close);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_flags() {
        let args = Args::parse_from([
            "lazymodal",
            "--theme",
            "Catppuccin Latte",
            "--no-scroll-lock",
            "--keep-on-close",
            "-c",
            "/tmp/lazymodal.toml",
        ]);
        assert_eq!(args.theme.as_deref(), Some("Catppuccin Latte"));
        assert!(args.no_scroll_lock);
        assert!(args.keep_on_close);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/lazymodal.toml")));
    }
}
