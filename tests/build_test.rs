#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use melo_scanner::build::dedupe_packages;
    use melo_scanner::manifest::MANIFEST_FILE;
    use melo_scanner::{BuildOptions, Builder, ExportedPackage, ManifestStorage, MemoryFileSystem, OsFileSystem};

    fn write(root: &Path, relative: &str, content: &str) -> Result<()> {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    fn create_module(root: &Path) -> Result<()> {
        write(root, "go.mod", "module example.com/calc\n\ngo 1.24.0\n")?;
        write(root, "main.go", "package main\n\nfunc main() {}\n")?;
        write(
            root,
            "adder/adder.go",
            "// melo:calc.adder\npackage adder\n\n// Add two numbers\nfunc Add(a, b int) int {\n\treturn a + b\n}\n",
        )?;
        write(
            root,
            "adder/more.go",
            "// melo:calc.adder\npackage adder\n\n// Counter of additions\ntype Counter struct {\n\tTotal int\n}\n",
        )?;
        write(
            root,
            "internal/store/store.go",
            "// melo:calc.store\npackage storage\n\n// Limit of stored values\nconst Limit = 16\n",
        )?;
        write(root, "internal/hidden/hidden.go", "package hidden\n\nvar Value = Missing\n")?;
        Ok(())
    }

    #[test]
    fn test_build_writes_manifest() -> Result<()> {
        let module_dir = tempdir()?;
        let output_dir = tempdir()?;
        create_module(module_dir.path())?;

        let options = BuildOptions {
            output_dir: output_dir.path().join("bindings"),
            parallel_threads: Some(2),
            ..BuildOptions::default()
        };
        let report = Builder::new(options).build(&OsFileSystem, module_dir.path())?;

        assert_eq!(report.manifest_path, output_dir.path().join("bindings").join(MANIFEST_FILE));
        assert!(report.manifest_path.exists());

        let manifest = &report.manifest;
        assert_eq!(manifest.module, "example.com/calc");
        assert_eq!(manifest.packages.len(), 2);

        let adder = manifest
            .find_package("example.com/calc/adder")
            .expect("adder package in manifest");
        assert_eq!(adder.package.bridge_path, "calc.adder");
        assert_eq!(adder.objects.functions[0].name, "Add");
        assert_eq!(adder.objects.structs[0].name, "Counter");
        assert!(!adder.fingerprint.is_empty());

        let store = manifest
            .find_package("example.com/calc/internal/store")
            .expect("store package in manifest");
        assert_eq!(store.package.alias_name, "storage");
        assert_eq!(store.objects.constants[0].type_name, "int");
        assert_eq!(store.objects.constants[0].value, "16");

        let stats = manifest.stats();
        assert_eq!(stats.packages, 2);
        assert_eq!(stats.functions, 1);
        assert_eq!(stats.structs, 1);
        assert_eq!(stats.constants, 1);

        let loaded = ManifestStorage::in_dir(output_dir.path().join("bindings")).load()?;
        assert_eq!(&loaded, manifest);
        Ok(())
    }

    #[test]
    fn test_build_fails_without_go_mod() -> Result<()> {
        let module_dir = tempdir()?;
        let output_dir = tempdir()?;
        write(module_dir.path(), "not_go.mod", "module example.com/calc\n")?;

        let options = BuildOptions {
            output_dir: output_dir.path().to_path_buf(),
            ..BuildOptions::default()
        };
        let result = Builder::new(options).build(&OsFileSystem, module_dir.path());

        assert!(result.is_err());
        assert!(!output_dir.path().join(MANIFEST_FILE).exists());
        Ok(())
    }

    #[test]
    fn test_build_fails_when_an_exported_package_is_broken() -> Result<()> {
        let module_dir = tempdir()?;
        let output_dir = tempdir()?;
        create_module(module_dir.path())?;
        write(
            module_dir.path(),
            "internal/hidden/hidden.go",
            "// melo:calc.hidden\npackage hidden\n\nvar Value = Missing\n",
        )?;

        let options = BuildOptions {
            output_dir: output_dir.path().to_path_buf(),
            ..BuildOptions::default()
        };
        let result = Builder::new(options).build(&OsFileSystem, module_dir.path());

        let error = result.expect_err("broken package must fail the build");
        assert!(format!("{:#}", error).contains("undefined: Missing"));
        assert!(!output_dir.path().join(MANIFEST_FILE).exists());
        Ok(())
    }

    #[test]
    fn test_options_from_config_file() -> Result<()> {
        let fs = MemoryFileSystem::new()
            .with_file("root/go.mod", "module example.com/calc\n")
            .with_file("root/melo.toml", "output_dir = \"dist\"\nparallel_threads = 3\n");

        let options = BuildOptions::load_or_default(&fs, Path::new("root"))?;

        assert_eq!(options.output_dir, Path::new("dist"));
        assert_eq!(options.thread_count(), 3);
        assert_eq!(options.manifest_file, MANIFEST_FILE);
        assert_eq!(options.manifest_path(), Path::new("dist").join(MANIFEST_FILE));
        Ok(())
    }

    #[test]
    fn test_options_default_without_config_file() -> Result<()> {
        let fs = MemoryFileSystem::new().with_file("root/go.mod", "module example.com/calc\n");

        let options = BuildOptions::load_or_default(&fs, Path::new("root"))?;

        assert_eq!(options, BuildOptions::default());
        Ok(())
    }

    #[test]
    fn test_invalid_config_file_is_an_error() {
        let fs = MemoryFileSystem::new().with_file("root/melo.toml", "parallel_threads = \"many\"\n");

        assert!(BuildOptions::load_or_default(&fs, Path::new("root")).is_err());
    }

    #[test]
    fn test_dedupe_keeps_first_entry_per_origin() {
        let package = |origin: &str, bridge: &str| ExportedPackage {
            origin_path: origin.to_string(),
            bridge_path: bridge.to_string(),
            alias_name: String::new(),
        };

        let unique = dedupe_packages(vec![
            package("example.com/a", "m.a"),
            package("example.com/b", "m.b"),
            package("example.com/a", "m.a"),
            package("example.com/a", "m.other"),
        ]);

        assert_eq!(unique, vec![package("example.com/a", "m.a"), package("example.com/b", "m.b")]);
    }
}
