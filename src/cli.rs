use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "git-autofixup")]
#[command(about = "Create fixup commits for the staged changes on a topic branch")]
#[command(version)]
pub struct Cli {
    /// Upstream revision the topic branch is based on
    #[arg(value_name = "REVISION", default_value = "@{upstream}")]
    pub revision: String,

    /// Increase verbosity (-v prints assignment decisions, -vv adds a
    /// blame diff for every hunk)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Diff context lines used when attributing hunks
    #[arg(short = 'c', long = "context", value_name = "N", default_value_t = 3)]
    pub context: u32,

    /// How conservative hunk assignment is (0=context, 1=adjacent,
    /// 2=surrounded)
    #[arg(
        short = 's',
        long = "strict",
        value_name = "N",
        default_value_t = 0,
        value_parser = clap::value_parser!(u8).range(0..=2)
    )]
    pub strict: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["git-autofixup"]);
        assert_eq!(cli.revision, "@{upstream}");
        assert_eq!(cli.context, 3);
        assert_eq!(cli.strict, 0);
        assert_eq!(cli.verbosity, 0);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from(["git-autofixup", "-vv", "-c", "0", "-s", "2", "main"]);
        assert_eq!(cli.revision, "main");
        assert_eq!(cli.context, 0);
        assert_eq!(cli.strict, 2);
        assert_eq!(cli.verbosity, 2);
    }

    #[test]
    fn test_strict_range_is_enforced() {
        assert!(Cli::try_parse_from(["git-autofixup", "-s", "3"]).is_err());
        assert!(Cli::try_parse_from(["git-autofixup", "-c", "-1"]).is_err());
    }
}
