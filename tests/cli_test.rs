#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use melo_scanner::cli::{dispatch, parse_arguments, Action, CommandHandler};

    /// Records what the command line asked for
    #[derive(Debug, Default)]
    struct SpyHandler {
        builds: Vec<(PathBuf, Option<PathBuf>)>,
        helps: Vec<Option<String>>,
    }

    impl CommandHandler for SpyHandler {
        fn build(&mut self, input: &Path, output: Option<&Path>) -> Result<()> {
            self.builds.push((input.to_path_buf(), output.map(Path::to_path_buf)));
            Ok(())
        }

        fn help(&mut self, error: Option<&str>) -> Result<()> {
            self.helps.push(error.map(str::to_string));
            Ok(())
        }
    }

    fn run(args: &[&str]) -> Result<SpyHandler> {
        let mut handler = SpyHandler::default();
        let invocation = parse_arguments(std::iter::once("melo").chain(args.iter().copied()));
        dispatch(invocation.action, &mut handler)?;
        Ok(handler)
    }

    #[test_case(&["build", ".", "--output", "output"], ".", Some("output") ; "build with output")]
    #[test_case(&["build", "."], ".", None ; "build with default output")]
    #[test_case(&["build", "--output", "out", "module"], "module", Some("out") ; "option before input")]
    #[test_case(&["-v", "build", "src"], "src", None ; "verbose build")]
    fn test_build_commands(args: &[&str], input: &str, output: Option<&str>) -> Result<()> {
        let handler = run(args)?;

        assert_eq!(handler.builds, vec![(PathBuf::from(input), output.map(PathBuf::from))]);
        assert!(handler.helps.is_empty());
        Ok(())
    }

    #[test_case(&["help"] ; "help command")]
    #[test_case(&["--help"] ; "help flag")]
    fn test_help_commands(args: &[&str]) -> Result<()> {
        let handler = run(args)?;

        assert!(handler.builds.is_empty());
        assert_eq!(handler.helps, vec![None]);
        Ok(())
    }

    #[test_case(&[] ; "missing command")]
    #[test_case(&["deploy"] ; "unknown command")]
    #[test_case(&["build"] ; "missing input")]
    #[test_case(&["build", ".", "--output"] ; "missing output value")]
    #[test_case(&["build", ".", "-o", "out"] ; "unknown option")]
    fn test_invalid_arguments_print_help(args: &[&str]) -> Result<()> {
        let handler = run(args)?;

        assert!(handler.builds.is_empty());
        assert_eq!(handler.helps.len(), 1);
        assert!(handler.helps[0].is_some());
        Ok(())
    }

    #[test]
    fn test_verbose_flag_is_reported() {
        let quiet = parse_arguments(["melo", "build", "."]);
        let verbose = parse_arguments(["melo", "build", ".", "--verbose"]);

        assert!(!quiet.verbose);
        assert!(verbose.verbose);
        assert_eq!(
            verbose.action,
            Action::Build {
                input: PathBuf::from("."),
                output: None,
            }
        );
    }
}
