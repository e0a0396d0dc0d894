#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use crate::error::Error;
    use crate::manifest::types::fingerprint;

    use crate::syntax::ast::{Decl, DeclKind, ExprKind, Spec};
    use crate::syntax::{parse_file, tokenize, unquote, File, TokenKind};
    use crate::typing::types::{ChanDir, Field};
    use crate::typing::{guess_package_name, Checker, Importer, Object, Type, TypeError, TypesInfo};
    use crate::typing::{InterfaceType, Method, Signature, Var};

    /// Importer naming every package after its last path element
    struct GuessingImporter;

    impl Importer for GuessingImporter {
        fn package_name(&self, import_path: &str) -> Option<String> {
            Some(guess_package_name(import_path))
        }
    }

    fn parse(source: &str) -> File {
        match parse_file(0, source) {
            Ok(file) => file,
            Err(e) => panic!("failed to parse test source: {}", e),
        }
    }

    fn check(source: &str) -> (TypesInfo, Vec<TypeError>) {
        let files = vec![parse(source)];
        Checker::new("example.com/m", &files, &GuessingImporter).check()
    }

    fn object<'i>(info: &'i TypesInfo, name: &str) -> &'i Object {
        match info.defs.values().find(|o| o.name() == name) {
            Some(object) => object,
            None => panic!("no object named {}", name),
        }
    }

    #[test]
    fn test_tokenize_inserts_semicolons_at_line_ends() {
        let lexed = tokenize("package a\nvar x = 1\n").unwrap();

        let kinds: Vec<TokenKind> = lexed.tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Package,
                TokenKind::Ident,
                TokenKind::Semicolon,
                TokenKind::Var,
                TokenKind::Ident,
                TokenKind::Assign,
                TokenKind::Int,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
        assert!(lexed.tokens[2].implicit);
    }

    #[test]
    fn test_unterminated_string_is_a_syntax_error() {
        let error = tokenize("package a\nconst s = \"open\n").unwrap_err();

        assert_eq!(error.line, 2);
        assert!(error.message.contains("not terminated"));
    }

    #[test]
    fn test_comment_group_text() {
        let file = parse("// Hello\n//   indented\n//go:generate stringer\npackage a\n");

        assert_eq!(file.comments.len(), 1);
        assert_eq!(file.comments[0].text(), "Hello\n  indented\n");
    }

    #[test]
    fn test_blank_line_splits_comment_groups() {
        let file = parse("package a\n\n// first\n\n// second\nconst A = 1\n");

        assert_eq!(file.comments.len(), 2);
        let Decl::Gen(decl) = &file.decls[0] else {
            panic!("expected a const declaration");
        };
        assert_eq!(decl.doc.as_ref().map(|d| d.text()), Some("second\n".to_string()));
    }

    #[test]
    fn test_grouped_const_specs_carry_iota_and_docs() {
        let file = parse("package a\n\nconst (\n\t// Zero doc\n\tZero = iota\n\tOne, Two = 1, 2\n)\n");

        let Decl::Gen(decl) = &file.decls[0] else {
            panic!("expected a const declaration");
        };
        assert_eq!(decl.kind, DeclKind::Const);
        assert!(decl.grouped);
        assert!(decl.doc.is_none());

        let specs: Vec<_> = decl
            .specs
            .iter()
            .filter_map(|s| match s {
                Spec::Value(v) => Some(v),
                _ => None,
            })
            .collect();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].doc.as_ref().map(|d| d.text()), Some("Zero doc\n".to_string()));
        assert_eq!(specs[1].iota, 1);
        assert_eq!(specs[1].names.len(), 2);
        assert_eq!(specs[1].values[1].text, "2");
    }

    #[test]
    fn test_initializer_keeps_source_text() {
        let file = parse("package a\n\nvar Table = map[string][]int{\n\t\"a\": {1, 2},\n}\n");

        let Decl::Gen(decl) = &file.decls[0] else {
            panic!("expected a var declaration");
        };
        let Spec::Value(spec) = &decl.specs[0] else {
            panic!("expected a value spec");
        };
        assert!(matches!(spec.values[0].kind, ExprKind::Composite { .. }));
        assert_eq!(spec.values[0].text, "map[string][]int{\n\t\"a\": {1, 2},\n}");
    }

    #[test]
    fn test_function_bodies_are_skipped() {
        let file = parse("package a\n\nfunc F() {\n\tif true {\n\t\tx := struct{}{}\n\t\t_ = x\n\t}\n}\n\nfunc G() int { return 1 }\n");

        let names: Vec<&str> = file
            .decls
            .iter()
            .filter_map(|d| match d {
                Decl::Func(f) => Some(f.name.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["F", "G"]);
    }

    #[test]
    fn test_syntax_error_reports_position() {
        let error = parse_file(0, "package a\n\nfunc (a, b T) M() {}\n").unwrap_err();

        assert_eq!(error.line, 3);
        assert!(error.message.contains("multiple receivers"));
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote(r#""a\tb\"cé""#), "a\tb\"cé");
        assert_eq!(unquote("`raw\\n`"), "raw\\n");
        assert_eq!(unquote(r#""\x41\101""#), "AA");
    }

    #[test]
    fn test_type_display() {
        let int = Type::Basic(crate::typing::BasicKind::Int);

        let chan = Type::Chan {
            dir: ChanDir::Both,
            elem: Box::new(Type::Chan {
                dir: ChanDir::Recv,
                elem: Box::new(int.clone()),
            }),
        };
        assert_eq!(chan.to_string(), "chan (<-chan int)");

        let tagged = Type::Struct(vec![Field {
            name: "Name".to_string(),
            ty: Type::Basic(crate::typing::BasicKind::String),
            embedded: false,
            tag: Some("json:\"name\"".to_string()),
        }]);
        assert_eq!(tagged.to_string(), r#"struct{Name string "json:\"name\""}"#);

        let interface = Type::Interface(InterfaceType {
            methods: vec![
                Method {
                    name: "B".to_string(),
                    signature: Signature {
                        params: Vec::new(),
                        results: vec![Var {
                            name: String::new(),
                            ty: int.clone(),
                        }],
                        variadic: false,
                    },
                },
                Method {
                    name: "A".to_string(),
                    signature: Signature::default(),
                },
            ],
            embeddeds: Vec::new(),
        });
        assert_eq!(interface.to_string(), "interface{A(); B() int}");
    }

    #[test]
    fn test_checker_folds_array_lengths() {
        let (info, errors) = check("package m\n\nconst N = 2 * 4\n\ntype Buf [N]byte\n");

        assert!(errors.is_empty(), "{:?}", errors);
        let Object::TypeName { ty, underlying, .. } = object(&info, "Buf") else {
            panic!("Buf should be a type");
        };
        assert_eq!(ty.to_string(), "example.com/m.Buf");
        assert_eq!(underlying.to_string(), "[8]byte");
    }

    #[test]
    fn test_checker_types_untyped_constants() {
        let (info, errors) = check("package m\n\nconst (\n\tRatio = 1.5\n\tFlag = 1 < 2\n\tLetter = 'a'\n)\n\nvar Scaled = 2 * Ratio\n");

        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(object(&info, "Ratio").ty().to_string(), "untyped float");
        assert_eq!(object(&info, "Flag").ty().to_string(), "untyped bool");
        assert_eq!(object(&info, "Letter").ty().to_string(), "untyped rune");
        assert_eq!(object(&info, "Scaled").ty().to_string(), "float64");
    }

    #[test]
    fn test_checker_reports_redeclaration() {
        let (_, errors) = check("package m\n\nvar A = 1\n\nfunc A() {}\n");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "A redeclared in this block");
    }

    #[test]
    fn test_checker_reports_invalid_recursive_type() {
        let (_, errors) = check("package m\n\ntype A B\n\ntype B A\n");

        assert!(errors.iter().any(|e| e.message.starts_with("invalid recursive type")), "{:?}", errors);
    }

    #[test]
    fn test_checker_rejects_methods_on_foreign_types() {
        let (_, errors) = check("package m\n\nfunc (s string) Len() int { return 0 }\n");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "cannot define new methods on non-local type string");
    }

    #[test]
    fn test_checker_keeps_imported_types_opaque() {
        let (info, errors) = check("package m\n\nimport (\n\t\"net/http\"\n\tyaml \"gopkg.in/yaml.v3\"\n)\n\nvar Client *http.Client\n\ntype Node = yaml.Node\n");

        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(object(&info, "Client").ty().to_string(), "*net/http.Client");
        let Object::TypeName { underlying, .. } = object(&info, "Node") else {
            panic!("Node should be a type");
        };
        assert_eq!(underlying.to_string(), "gopkg.in/yaml.v3.Node");
    }

    #[test]
    fn test_checker_reports_unknown_qualifier() {
        let (_, errors) = check("package m\n\nvar Now = clock.Now()\n\nvar Zone timezone.Zone\n");

        assert!(errors.iter().any(|e| e.message == "undefined: timezone"), "{:?}", errors);
    }

    #[test]
    fn test_checker_types_well_known_standard_library_values() {
        let (info, errors) = check(
            "package m\n\nimport (\n\t\"math\"\n\t\"net/http\"\n\t\"time\"\n)\n\nconst Timeout = 3 * time.Second\n\nconst Tau = 2 * math.Pi\n\nvar Client = http.DefaultClient\n",
        );

        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(object(&info, "Timeout").ty().to_string(), "time.Duration");
        assert_eq!(object(&info, "Tau").ty().to_string(), "untyped float");
        assert_eq!(object(&info, "Client").ty().to_string(), "*net/http.Client");
    }

    #[test]
    fn test_checker_reports_constant_division_by_zero() {
        let (info, errors) = check(
            "package m\n\nconst Y = 10 / 0\n\nconst R = 7 % (3 - 3)\n\nvar F float64\n\nvar G = F / 0\n",
        );

        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["invalid operation: division by zero"; 2]);
        assert_eq!(object(&info, "G").ty().to_string(), "float64");
    }

    #[test]
    fn test_fingerprint_error_keeps_cause() {
        let mut unhashable = BTreeMap::new();
        unhashable.insert((1, 2), 3);

        let Err(Error::Manifest(message)) = fingerprint(&unhashable) else {
            panic!("tuple keys cannot be serialized to JSON");
        };
        assert!(message.contains("Failed to serialize value for hashing"), "{}", message);
        assert!(message.contains("key must be a string"), "{}", message);
    }

    #[test]
    fn test_guess_package_name() {
        assert_eq!(guess_package_name("net/http"), "http");
        assert_eq!(guess_package_name("gopkg.in/yaml.v3"), "yaml");
        assert_eq!(guess_package_name("github.com/mattn/go-isatty"), "isatty");
        assert_eq!(guess_package_name("example.com/m/v2"), "m");
    }
}
