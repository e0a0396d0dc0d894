#[cfg(test)]
mod tests {
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    use melo_scanner::inspector::{
        ExportedArgument, ExportedConstant, ExportedField, ExportedInterface, ExportedRoutine, ExportedStruct,
        ExportedType, ExportedVariable,
    };
    use melo_scanner::{inspect_package, Error, ExportedObjects, MemoryFileSystem, ModuleLoader};

    const FIXTURE: &str = r#"// melo:package

package fixtures


// Go doc for my constant
const MyConst = "hello"

// Go doc for my type
type MyType string

// Go doc for my variable
var MyVar = "world"

// Go doc for my struct
type MyStruct struct {
	// Go doc for my field
	Name string
}

// Go doc for my interface
type MyInterface interface {
	// Go doc for my interface method
	SayHello(name string) string
}

// Go doc for my function
func SumTwoNumbers(a, b int) int {
	return a + b
}

// Go doc for my second function
func CanSumTwoNumbers(a, b int) (sum int, err error) {
	return a + b, nil
}

// Go doc for my method
func (s MyStruct) CanSumTwoNumbers2(a, b int) (sum int, err error) {
	return a + b, nil
}
"#;

    const SHAPES: &str = r#"// melo:geometry.shapes
package shapes

import (
	"context"
	"errors"
	"time"
)

// Size of a shape
type Size int

const (
	// Small is the smallest size
	Small Size = iota
	Large Size = 10
)

// Origin of every shape
var Origin = Point{}

var (
	Registry = map[string]*Point{}
	Started  time.Time
	ErrEmpty = errors.New("empty")
)

// Point in the plane
type Point struct {
	X, Y float64
	Tags []string `json:"tags"`
}

// Sizer reports a size
type Sizer interface {
	Size() Size
}

// Shape is anything with an area
type Shape interface {
	Sizer
	// Area of the shape
	Area() float64
}

type Handler func(ctx context.Context, values ...int) error

// NewPoint builds a point
func NewPoint(x, y float64) Point {
	return Point{X: x, Y: y}
}

func Max[T ~int | ~float64](values ...T) T {
	var m T
	for _, v := range values {
		if v > m {
			m = v
		}
	}
	return m
}

// Scale the point
func (p *Point) Scale(factor float64) *Point {
	return &Point{X: p.X * factor, Y: p.Y * factor}
}

// Double the size
func (s Size) Double() Size {
	return s * 2
}

func (p Point) private() {}
"#;

    const SHAPES_FORMAT: &str = r#"package shapes

import "fmt"

// String formats the point
func (p Point) String() string {
	return fmt.Sprintf("(%v, %v)", p.X, p.Y)
}
"#;

    fn module() -> MemoryFileSystem {
        MemoryFileSystem::new()
            .with_file("root/go.mod", "module example.com/geometry\n\ngo 1.24.0\n")
            .with_file("root/fixtures/fixture.go", FIXTURE)
            .with_file("root/shapes/shapes.go", SHAPES)
            .with_file("root/shapes/format.go", SHAPES_FORMAT)
            .with_file("root/shapes/shapes_test.go", "package shapes\n\nfunc TestBroken( {\n")
    }

    fn doc(text: &str) -> Option<String> {
        Some(text.to_string())
    }

    fn arg(name: &str, type_name: &str) -> ExportedArgument {
        ExportedArgument {
            name: name.to_string(),
            type_name: type_name.to_string(),
        }
    }

    fn field(name: &str, type_name: &str) -> ExportedField {
        ExportedField {
            name: name.to_string(),
            type_name: type_name.to_string(),
        }
    }

    fn routine(name: &str, arguments: Vec<ExportedArgument>, return_types: &[&str], doc: Option<String>) -> ExportedRoutine {
        ExportedRoutine {
            name: name.to_string(),
            arguments,
            return_types: return_types.iter().map(|t| t.to_string()).collect(),
            doc,
        }
    }

    fn inspect(fs: &MemoryFileSystem, import_path: &str) -> melo_scanner::Result<ExportedObjects> {
        let loader = ModuleLoader::new(fs, "root", "example.com/geometry");
        inspect_package(&loader, import_path)
    }

    #[test]
    fn test_inspect_fixture_package() -> Result<()> {
        let fs = module();

        let objects = inspect(&fs, "example.com/geometry/fixtures")?;

        let expected = ExportedObjects {
            constants: vec![ExportedConstant {
                name: "MyConst".to_string(),
                type_name: "string".to_string(),
                value: "hello".to_string(),
                doc: doc("Go doc for my constant"),
            }],
            variables: vec![ExportedVariable {
                name: "MyVar".to_string(),
                type_name: "string".to_string(),
                value: "world".to_string(),
                doc: doc("Go doc for my variable"),
            }],
            types: vec![ExportedType {
                name: "MyType".to_string(),
                underlying_type_name: "string".to_string(),
                doc: doc("Go doc for my type"),
            }],
            structs: vec![ExportedStruct {
                name: "MyStruct".to_string(),
                fields: vec![field("Name", "string")],
                methods: vec![routine(
                    "CanSumTwoNumbers2",
                    vec![arg("a", "int"), arg("b", "int")],
                    &["int", "error"],
                    doc("Go doc for my method"),
                )],
                doc: doc("Go doc for my struct"),
            }],
            interfaces: vec![ExportedInterface {
                name: "MyInterface".to_string(),
                methods: vec![routine(
                    "SayHello",
                    vec![arg("name", "string")],
                    &["string"],
                    doc("Go doc for my interface method"),
                )],
                doc: doc("Go doc for my interface"),
            }],
            functions: vec![
                routine(
                    "SumTwoNumbers",
                    vec![arg("a", "int"), arg("b", "int")],
                    &["int"],
                    doc("Go doc for my function"),
                ),
                routine(
                    "CanSumTwoNumbers",
                    vec![arg("a", "int"), arg("b", "int")],
                    &["int", "error"],
                    doc("Go doc for my second function"),
                ),
            ],
        };

        assert_eq!(objects, expected);
        Ok(())
    }

    #[test]
    fn test_inspect_qualifies_local_types() -> Result<()> {
        let fs = module();

        let objects = inspect(&fs, "example.com/geometry/shapes")?;

        let size = "example.com/geometry/shapes.Size";
        let point = "example.com/geometry/shapes.Point";

        assert_eq!(
            objects.constants,
            vec![
                ExportedConstant {
                    name: "Small".to_string(),
                    type_name: size.to_string(),
                    value: "iota".to_string(),
                    doc: doc("Small is the smallest size"),
                },
                ExportedConstant {
                    name: "Large".to_string(),
                    type_name: size.to_string(),
                    value: "10".to_string(),
                    doc: None,
                },
            ]
        );

        assert_eq!(
            objects.variables,
            vec![
                ExportedVariable {
                    name: "Origin".to_string(),
                    type_name: point.to_string(),
                    value: "Point{}".to_string(),
                    doc: doc("Origin of every shape"),
                },
                ExportedVariable {
                    name: "Registry".to_string(),
                    type_name: format!("map[string]*{}", point),
                    value: "map[string]*Point{}".to_string(),
                    doc: None,
                },
                ExportedVariable {
                    name: "Started".to_string(),
                    type_name: "time.Time".to_string(),
                    value: String::new(),
                    doc: None,
                },
                ExportedVariable {
                    name: "ErrEmpty".to_string(),
                    type_name: "error".to_string(),
                    value: r#"errors.New("empty")"#.to_string(),
                    doc: None,
                },
            ]
        );

        assert_eq!(
            objects.types,
            vec![
                ExportedType {
                    name: "Size".to_string(),
                    underlying_type_name: "int".to_string(),
                    doc: doc("Size of a shape"),
                },
                ExportedType {
                    name: "Handler".to_string(),
                    underlying_type_name: "func(ctx context.Context, values ...int) error".to_string(),
                    doc: None,
                },
            ]
        );

        Ok(())
    }

    #[test]
    fn test_methods_attach_across_files_in_encounter_order() -> Result<()> {
        let fs = module();

        let objects = inspect(&fs, "example.com/geometry/shapes")?;

        let scaled = "*example.com/geometry/shapes.Point";
        assert_eq!(
            objects.structs,
            vec![ExportedStruct {
                name: "Point".to_string(),
                fields: vec![field("X", "float64"), field("Y", "float64"), field("Tags", "[]string")],
                // format.go is loaded before shapes.go
                methods: vec![
                    routine("String", vec![], &["string"], doc("String formats the point")),
                    routine(
                        "Scale",
                        vec![arg("factor", "float64")],
                        &[scaled],
                        doc("Scale the point"),
                    ),
                ],
                doc: doc("Point in the plane"),
            }]
        );

        Ok(())
    }

    #[test]
    fn test_methods_on_non_struct_types_are_dropped() -> Result<()> {
        let fs = module();

        let objects = inspect(&fs, "example.com/geometry/shapes")?;

        let all_methods: Vec<&str> = objects
            .structs
            .iter()
            .flat_map(|s| s.methods.iter().map(|m| m.name.as_str()))
            .collect();
        assert!(!all_methods.contains(&"Double"));
        assert!(!all_methods.contains(&"private"));
        Ok(())
    }

    #[test]
    fn test_interfaces_list_only_declared_methods() -> Result<()> {
        let fs = module();

        let objects = inspect(&fs, "example.com/geometry/shapes")?;

        assert_eq!(
            objects.interfaces,
            vec![
                ExportedInterface {
                    name: "Sizer".to_string(),
                    methods: vec![routine("Size", vec![], &["example.com/geometry/shapes.Size"], None)],
                    doc: doc("Sizer reports a size"),
                },
                ExportedInterface {
                    name: "Shape".to_string(),
                    methods: vec![routine("Area", vec![], &["float64"], doc("Area of the shape"))],
                    doc: doc("Shape is anything with an area"),
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn test_generic_and_variadic_functions() -> Result<()> {
        let fs = module();

        let objects = inspect(&fs, "example.com/geometry/shapes")?;

        assert_eq!(
            objects.functions,
            vec![
                routine(
                    "NewPoint",
                    vec![arg("x", "float64"), arg("y", "float64")],
                    &["example.com/geometry/shapes.Point"],
                    doc("NewPoint builds a point"),
                ),
                routine("Max", vec![arg("values", "[]T")], &["T"], None),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_inspection_is_deterministic() -> Result<()> {
        let fs = module();

        let first = inspect(&fs, "example.com/geometry/shapes")?;
        let second = inspect(&fs, "example.com/geometry/shapes")?;

        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_undefined_type_fails_the_load() {
        let fs = MemoryFileSystem::new()
            .with_file("root/go.mod", "module example.com/geometry\n")
            .with_file("root/broken/broken.go", "package broken\n\nvar Broken = Missing{}\n");

        let result = inspect(&fs, "example.com/geometry/broken");

        match result {
            Err(Error::Load { import_path, reason }) => {
                assert_eq!(import_path, "example.com/geometry/broken");
                assert!(reason.contains("undefined: Missing"), "{}", reason);
            }
            other => panic!("expected a load error, got {:?}", other),
        }
    }

    #[test]
    fn test_syntax_error_fails_the_load() {
        let fs = MemoryFileSystem::new()
            .with_file("root/go.mod", "module example.com/geometry\n")
            .with_file("root/broken/broken.go", "package broken\n\nfunc Open( {\n");

        let result = inspect(&fs, "example.com/geometry/broken");

        assert!(matches!(result, Err(Error::Load { .. })));
    }

    #[test]
    fn test_unknown_package_fails_the_load() {
        let fs = module();

        assert!(matches!(
            inspect(&fs, "example.com/geometry/nowhere"),
            Err(Error::Load { .. })
        ));
        assert!(matches!(inspect(&fs, "github.com/other/module"), Err(Error::Load { .. })));
    }

    #[test]
    fn test_implicitly_repeated_constant_is_a_structural_mismatch() {
        let fs = MemoryFileSystem::new()
            .with_file("root/go.mod", "module example.com/geometry\n")
            .with_file(
                "root/levels/levels.go",
                "package levels\n\nconst (\n\tLow = iota\n\tHigh\n)\n",
            );

        let result = inspect(&fs, "example.com/geometry/levels");

        match result {
            Err(Error::StructuralMismatch { name, index, values }) => {
                assert_eq!(name, "High");
                assert_eq!(index, 0);
                assert_eq!(values, 0);
            }
            other => panic!("expected a structural mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_multi_value_initializer_is_a_structural_mismatch() {
        let fs = MemoryFileSystem::new()
            .with_file("root/go.mod", "module example.com/geometry\n")
            .with_file(
                "root/pairs/pairs.go",
                "package pairs\n\nfunc pair() (int, string) {\n\treturn 1, \"one\"\n}\n\nvar count, Label = pair()\n",
            );

        let result = inspect(&fs, "example.com/geometry/pairs");

        assert!(matches!(
            result,
            Err(Error::StructuralMismatch { ref name, index: 1, values: 1 }) if name == "Label"
        ));
    }

    const UNITS: &str = r#"package units

// Name of the unit system
const Name = "metric"

type Meter float64

const Unit Meter = 1

type Ruler struct {
	Length Meter
}

func New() *Ruler {
	return &Ruler{Length: Unit}
}

func (r *Ruler) Measure() Meter {
	return r.Length
}
"#;

    const SURVEY: &str = r#"// melo:geometry.survey
package survey

import (
	"math"
	"net/http"
	"time"

	"example.com/geometry/units"
)

const (
	System = units.Name
	Step   = units.Unit * 2
	Tau    = 2 * math.Pi
)

const Timeout = time.Second

var (
	Default = units.New()
	Client  = http.DefaultClient
	Span    = units.Meter(3)
)
"#;

    fn constant(name: &str, type_name: &str, value: &str) -> ExportedConstant {
        ExportedConstant {
            name: name.to_string(),
            type_name: type_name.to_string(),
            value: value.to_string(),
            doc: None,
        }
    }

    fn variable(name: &str, type_name: &str, value: &str) -> ExportedVariable {
        ExportedVariable {
            name: name.to_string(),
            type_name: type_name.to_string(),
            value: value.to_string(),
            doc: None,
        }
    }

    #[test]
    fn test_values_initialized_from_other_packages() -> Result<()> {
        let fs = MemoryFileSystem::new()
            .with_file("root/go.mod", "module example.com/geometry\n")
            .with_file("root/units/units.go", UNITS)
            .with_file("root/survey/survey.go", SURVEY);

        let objects = inspect(&fs, "example.com/geometry/survey")?;

        assert_eq!(
            objects.constants,
            vec![
                constant("System", "string", "units.Name"),
                constant("Step", "example.com/geometry/units.Meter", "units.Unit * 2"),
                constant("Tau", "float", "2 * math.Pi"),
                constant("Timeout", "time.Duration", "time.Second"),
            ]
        );
        assert_eq!(
            objects.variables,
            vec![
                variable("Default", "*example.com/geometry/units.Ruler", "units.New()"),
                variable("Client", "*net/http.Client", "http.DefaultClient"),
                variable("Span", "example.com/geometry/units.Meter", "units.Meter(3)"),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_missing_member_of_module_package_fails_the_load() {
        let fs = MemoryFileSystem::new()
            .with_file("root/go.mod", "module example.com/geometry\n")
            .with_file("root/units/units.go", UNITS)
            .with_file(
                "root/broken/broken.go",
                "package broken\n\nimport \"example.com/geometry/units\"\n\nconst Bad = units.Missing\n",
            );

        let result = inspect(&fs, "example.com/geometry/broken");

        assert!(
            matches!(result, Err(Error::Load { ref reason, .. }) if reason.contains("undefined: units.Missing")),
            "{:?}",
            result
        );
    }

    #[test]
    fn test_import_cycle_fails_the_load() {
        let fs = MemoryFileSystem::new()
            .with_file("root/go.mod", "module example.com/geometry\n")
            .with_file(
                "root/left/left.go",
                "package left\n\nimport \"example.com/geometry/right\"\n\nvar Mirror = right.Mirror\n\nconst Name = \"left\"\n",
            )
            .with_file(
                "root/right/right.go",
                "package right\n\nimport \"example.com/geometry/left\"\n\nvar Mirror = left.Name\n",
            );

        let result = inspect(&fs, "example.com/geometry/left");

        assert!(
            matches!(result, Err(Error::Load { ref reason, .. }) if reason.contains("import cycle not allowed")),
            "{:?}",
            result
        );
    }

    #[test]
    fn test_broken_module_import_fails_the_load() {
        let fs = MemoryFileSystem::new()
            .with_file("root/go.mod", "module example.com/geometry\n")
            .with_file("root/units/units.go", "package units\n\nvar Name = missing\n")
            .with_file(
                "root/survey/survey.go",
                "package survey\n\nimport \"example.com/geometry/units\"\n\nvar System = units.Name\n",
            );

        let result = inspect(&fs, "example.com/geometry/survey");

        assert!(
            matches!(result, Err(Error::Load { ref reason, .. }) if reason.contains("could not import example.com/geometry/units")),
            "{:?}",
            result
        );
    }

    #[test]
    fn test_methods_declared_on_an_alias_belong_to_its_target() -> Result<()> {
        let fs = MemoryFileSystem::new()
            .with_file("root/go.mod", "module example.com/geometry\n")
            .with_file(
                "root/polygons/polygons.go",
                "package polygons\n\ntype Shape struct {\n\tSides int\n}\n\ntype Polygon = Shape\n\nfunc (p Polygon) Perimeter() int {\n\treturn p.Sides\n}\n",
            );

        let objects = inspect(&fs, "example.com/geometry/polygons")?;

        let methods: Vec<(&str, Vec<&str>)> = objects
            .structs
            .iter()
            .map(|s| (s.name.as_str(), s.methods.iter().map(|m| m.name.as_str()).collect()))
            .collect();
        assert_eq!(methods, vec![("Shape", vec!["Perimeter"]), ("Polygon", vec![])]);
        Ok(())
    }

    #[test]
    fn test_constant_division_by_zero_fails_the_load() {
        let fs = MemoryFileSystem::new()
            .with_file("root/go.mod", "module example.com/geometry\n")
            .with_file("root/math/math.go", "package math\n\nconst Y = 10 / 0\n");

        let result = inspect(&fs, "example.com/geometry/math");

        assert!(
            matches!(result, Err(Error::Load { ref reason, .. }) if reason.contains("division by zero")),
            "{:?}",
            result
        );
    }

    #[test]
    fn test_unexported_declarations_are_skipped() -> Result<()> {
        let fs = MemoryFileSystem::new()
            .with_file("root/go.mod", "module example.com/geometry\n")
            .with_file(
                "root/hidden/hidden.go",
                "package hidden\n\nconst secret = 1\n\nvar state int\n\ntype inner struct{}\n\nfunc helper() {}\n",
            );

        let objects = inspect(&fs, "example.com/geometry/hidden")?;

        assert!(objects.is_empty());
        Ok(())
    }
}
