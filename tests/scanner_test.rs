#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use melo_scanner::package::scanner::GO_EXPORTED_DIRECTIVE;
    use melo_scanner::{check_input_folder, scan_module, Error, ExportedPackage, MemoryFileSystem, OsFileSystem};

    fn exported(origin_path: &str, bridge_path: &str, alias_name: &str) -> ExportedPackage {
        ExportedPackage {
            origin_path: origin_path.to_string(),
            bridge_path: bridge_path.to_string(),
            alias_name: alias_name.to_string(),
        }
    }

    fn module_tree() -> MemoryFileSystem {
        let directive = GO_EXPORTED_DIRECTIVE;
        MemoryFileSystem::new()
            .with_file("root/go.mod", "module example.com\n\ngo 1.24.0\n")
            .with_file("root/main.go", "package main\n\nfunc main() {}")
            .with_file(
                "root/exported_package/other.go",
                format!("{directive}mypackage.exported_package\n\npackage exported_package\n\nfunc main() {{}}"),
            )
            .with_file(
                "root/exported_package/other_test.go",
                format!("{directive}mypackage.exported_package\n\npackage exported_package\n\nfunc TestMain(t *testing.T) {{}}"),
            )
            .with_file("root/unexported_package/other.go", "package unexported_package\n\nfunc main() {}")
            .with_file("root/mixed_package/not_exported_file.go", "package mixed_package\n\nfunc main() {}")
            .with_file(
                "root/mixed_package/exported_file.go",
                format!("{directive}mypackage.mixed_package\n\npackage mixed_package\n\nfunc main() {{}}"),
            )
            .with_file(
                "root/package_with_different_name/bacon.go",
                format!("{directive}mypackage.baconpackage\n\npackage baconpackage\n\nfunc main() {{}}"),
            )
    }

    #[test]
    fn test_scan_returns_only_exported_packages() -> Result<()> {
        let fs = module_tree();

        let packages = scan_module(&fs, Path::new("root"), "example.com")?;

        assert_eq!(
            packages,
            vec![
                exported("example.com/exported_package", "mypackage.exported_package", ""),
                exported("example.com/mixed_package", "mypackage.mixed_package", ""),
                exported(
                    "example.com/package_with_different_name",
                    "mypackage.baconpackage",
                    "baconpackage"
                ),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_directive_after_package_clause_still_exports() -> Result<()> {
        let fs = MemoryFileSystem::new().with_file(
            "root/late/late.go",
            format!("package late\n\n{}mypackage.late\n\nfunc main() {{}}", GO_EXPORTED_DIRECTIVE),
        );

        let packages = scan_module(&fs, Path::new("root"), "example.com")?;

        assert_eq!(packages, vec![exported("example.com/late", "mypackage.late", "")]);
        Ok(())
    }

    #[test]
    fn test_each_exported_file_yields_an_entry() -> Result<()> {
        let directive = GO_EXPORTED_DIRECTIVE;
        let fs = MemoryFileSystem::new()
            .with_file("root/twice/a.go", format!("{directive}m.twice\npackage twice\n"))
            .with_file("root/twice/b.go", format!("{directive}m.twice\npackage twice\n"));

        let packages = scan_module(&fs, Path::new("root"), "example.com")?;

        assert_eq!(packages.len(), 2);
        assert!(packages.iter().all(|p| p.origin_path == "example.com/twice"));
        Ok(())
    }

    #[test]
    fn test_indented_directive_is_ignored() -> Result<()> {
        let fs = MemoryFileSystem::new().with_file(
            "root/indented/file.go",
            format!("  {}m.indented\npackage indented\n", GO_EXPORTED_DIRECTIVE),
        );

        let packages = scan_module(&fs, Path::new("root"), "example.com")?;

        assert!(packages.is_empty());
        Ok(())
    }

    #[test]
    fn test_main_package_is_not_aliased() -> Result<()> {
        let fs = MemoryFileSystem::new().with_file(
            "root/cmd/tool/main.go",
            format!("{}m.tool\npackage main\n", GO_EXPORTED_DIRECTIVE),
        );

        let packages = scan_module(&fs, Path::new("root"), "example.com/mod")?;

        assert_eq!(packages, vec![exported("example.com/mod/cmd/tool", "m.tool", "")]);
        Ok(())
    }

    #[test]
    fn test_missing_root_is_an_io_error() {
        let fs = MemoryFileSystem::new();

        let result = scan_module(&fs, Path::new("nowhere"), "example.com");

        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn test_unreadable_file_aborts_the_scan() -> Result<()> {
        let root = tempdir()?;
        fs::create_dir_all(root.path().join("good"))?;
        fs::create_dir_all(root.path().join("latin1"))?;
        fs::write(
            root.path().join("good/good.go"),
            format!("{}m.good\npackage good\n", GO_EXPORTED_DIRECTIVE),
        )?;
        // Not valid UTF-8, so the file cannot be read as source text
        fs::write(root.path().join("latin1/latin1.go"), b"package latin1\n// caf\xe9\n")?;

        let result = scan_module(&OsFileSystem, root.path(), "example.com");

        match result {
            Err(Error::Io { path, .. }) => assert_eq!(path, root.path().join("latin1/latin1.go")),
            other => panic!("expected a read error, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_check_input_folder() -> Result<()> {
        let fs = MemoryFileSystem::new()
            .with_file("root/right_input_folder/go.mod", "module example.com\n\ngo 1.24.0\n")
            .with_file("root/wrong_input_folder/not_go.mod", "module example.com\n\ngo 1.24.0\n")
            .with_file("root/input_folder_wrong_go_mod/go.mod", "odule example.com\n\ngo 1.24.0\n");

        let module = check_input_folder(&fs, Path::new("root/right_input_folder"))?;
        assert_eq!(module.module_path, "example.com");
        assert_eq!(module.root, Path::new("root/right_input_folder"));

        let missing = check_input_folder(&fs, Path::new("root/wrong_input_folder"));
        assert!(matches!(missing, Err(Error::Io { .. })));

        let malformed = check_input_folder(&fs, Path::new("root/input_folder_wrong_go_mod"));
        assert!(matches!(malformed, Err(Error::InvalidModule { .. })));
        Ok(())
    }
}
