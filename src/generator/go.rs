use crate::error::RustyConfigError;
use crate::generator::write_source;
use crate::generator::CodeGenerator;
use crate::generator::Language;
use crate::generator::SourceWriter;
use crate::table::schema::TableSchema;
use std::path::Path;
use std::path::PathBuf;

const DEFAULT_PACKAGE: &str = "config";
const BASE_FILE: &str = "basedata.go";
const MAPPER_FILE: &str = "mapper.go";

/// Go generator.
///
/// Every table becomes a `D<Table>` struct with all columns, a `GetID`
/// accessor satisfying the generic `DBaseData` interface, and a `D<Table>List`
/// struct. `mapper.go` registers each item type with its list type.
pub struct GoGenerator {
    id_field: String,
}

impl GoGenerator {
    pub fn new(id_field: &str) -> Self {
        GoGenerator { id_field: id_field.to_owned() }
    }

    fn base_interface(&self, package: &str) -> String {
        let mut writer = SourceWriter::new();
        writer.line(&format!("package {package}")).blank();
        writer.open("type DataIndex interface {");
        writer.line("int16 | int32 | int64 | float32 | float64 | string");
        writer.close("}").blank();
        writer.open("type DBaseData[T DataIndex] interface {");
        writer.line("GetID() T");
        writer.close("}");
        writer.finish()
    }

    fn table_struct(&self, package: &str, table: &TableSchema) -> String {
        let name = &table.table_name;
        let mut writer = SourceWriter::new();
        writer.line(&format!("package {package}")).blank();

        writer.open(&format!("type D{name} struct {{"));
        for field in &table.fields {
            writer.line(&format!("{} {}", field.name, go_type(&field.field_type)));
        }
        writer.close("}").blank();

        writer.open(&format!("func (data D{name}) GetID() {} {{", go_type(&table.id_field_type)));
        writer.line(&format!("return data.{}", self.id_field));
        writer.close("}").blank();

        writer.open(&format!("type D{name}List struct {{"));
        writer.line(&format!("Content []D{name}"));
        writer.close("}");
        writer.finish()
    }

    fn mapper(&self, package: &str, tables: &[TableSchema]) -> String {
        let mut writer = SourceWriter::new();
        writer.line(&format!("package {package}")).blank();
        writer.line("import \"reflect\"").blank();
        writer.line("var itemToList = make(map[reflect.Type]reflect.Type)").blank();

        writer.open("func InitMapper() {");
        for table in tables {
            let name = &table.table_name;
            writer.line(&format!("registerItemToList(D{name}{{}}, D{name}List{{}})"));
        }
        writer.close("}").blank();

        writer.open("func registerItemToList(item, list interface{}) {");
        writer.line("itemToList[reflect.TypeOf(item)] = reflect.TypeOf(list)");
        writer.close("}").blank();

        writer.open("func GetListType(item reflect.Type) reflect.Type {");
        writer.line("return itemToList[item]");
        writer.close("}");
        writer.finish()
    }
}

impl CodeGenerator for GoGenerator {
    fn language(&self) -> Language {
        Language::Go
    }

    fn generate(&self, namespace: &str, tables: &[TableSchema], out_dir: &Path) -> Result<Vec<PathBuf>, RustyConfigError> {
        let package = package_name(namespace);
        let mut paths = vec![write_source(out_dir, BASE_FILE, &self.base_interface(&package))?];
        for table in tables {
            let file_name = format!("{}.go", table.table_name.to_lowercase());
            paths.push(write_source(out_dir, &file_name, &self.table_struct(&package, table))?);
        }
        paths.push(write_source(out_dir, MAPPER_FILE, &self.mapper(&package, tables))?);
        Ok(paths)
    }
}

/// Go spelling of a declared column type; unknown names pass through
fn go_type(field_type: &str) -> String {
    if let Some(element) = field_type.strip_suffix("[]") {
        return format!("[]{}", go_type(element));
    }
    match field_type {
        "short" => "int16",
        "int" => "int32",
        "long" => "int64",
        "float" => "float32",
        "double" => "float64",
        other => other,
    }.to_owned()
}

/// Package clause for a namespace: its last dotted segment in lowercase
fn package_name(namespace: &str) -> String {
    let package: String = namespace
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_lowercase();
    match package.chars().next() {
        Some(first) if first.is_ascii_alphabetic() => package,
        _ => DEFAULT_PACKAGE.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::schema::FieldDescriptor;
    use pretty_assertions::assert_eq;

    fn monster() -> TableSchema {
        TableSchema {
            table_name: "Monster".to_owned(),
            id_field_type: "short".to_owned(),
            fields: vec![
                FieldDescriptor { name: "ID".to_owned(), field_type: "short".to_owned() },
                FieldDescriptor { name: "Speed".to_owned(), field_type: "double".to_owned() },
                FieldDescriptor { name: "Skills".to_owned(), field_type: "string[]".to_owned() },
            ],
        }
    }

    #[test]
    fn type_mapping() {
        assert_eq!(go_type("short"), "int16");
        assert_eq!(go_type("int"), "int32");
        assert_eq!(go_type("long"), "int64");
        assert_eq!(go_type("float"), "float32");
        assert_eq!(go_type("double"), "float64");
        assert_eq!(go_type("string"), "string");
        assert_eq!(go_type("float[]"), "[]float32");
    }

    #[test]
    fn package_names() {
        assert_eq!(package_name(""), "config");
        assert_eq!(package_name("Game.Config"), "config");
        assert_eq!(package_name("Game.TableData"), "tabledata");
        assert_eq!(package_name("9lives"), "config");
    }

    #[test]
    fn table_struct() {
        let source = GoGenerator::new("ID").table_struct("tables", &monster());
        assert_eq!(source, concat!(
            "package tables\n",
            "\n",
            "type DMonster struct {\n",
            "    ID int16\n",
            "    Speed float64\n",
            "    Skills []string\n",
            "}\n",
            "\n",
            "func (data DMonster) GetID() int16 {\n",
            "    return data.ID\n",
            "}\n",
            "\n",
            "type DMonsterList struct {\n",
            "    Content []DMonster\n",
            "}\n",
        ));
    }

    #[test]
    fn mapper_registers_every_table() {
        let mut item = monster();
        item.table_name = "Item".to_owned();
        let source = GoGenerator::new("ID").mapper("tables", &[monster(), item]);
        assert!(source.contains("    registerItemToList(DMonster{}, DMonsterList{})\n"));
        assert!(source.contains("    registerItemToList(DItem{}, DItemList{})\n"));
        assert!(source.contains("import \"reflect\"\n"));
    }

    #[test]
    fn generate_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = GoGenerator::new("ID").generate("", &[monster()], dir.path()).unwrap();
        assert_eq!(paths.len(), 3);
        assert!(dir.path().join("monster.go").exists());
        let base = std::fs::read_to_string(dir.path().join("basedata.go")).unwrap();
        assert!(base.starts_with("package config\n"));
        assert!(base.contains("type DBaseData[T DataIndex] interface {\n    GetID() T\n}\n"));
    }
}
