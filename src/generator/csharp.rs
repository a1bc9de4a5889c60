use crate::error::RustyConfigError;
use crate::generator::write_source;
use crate::generator::CodeGenerator;
use crate::generator::Language;
use crate::generator::SourceWriter;
use crate::table::schema::TableSchema;
use std::path::Path;
use std::path::PathBuf;

const BASE_CLASS_NAME: &str = "DBaseData";
const BASE_CLASS_FILE: &str = "BaseData.cs";

/// C# generator.
///
/// Every table becomes `D<Table> : DBaseData<IdType>` holding one public field
/// per column, plus `D<Table>List` wrapping the `Content` array of a data file.
/// The id lives on the base class, so the id column is not repeated.
pub struct CSharpGenerator {
    id_field: String,
}

impl CSharpGenerator {
    pub fn new(id_field: &str) -> Self {
        CSharpGenerator { id_field: id_field.to_owned() }
    }

    fn base_class(&self, namespace: &str) -> String {
        let mut writer = SourceWriter::new();
        open_namespace(&mut writer, namespace);
        writer.line(&format!("public class {BASE_CLASS_NAME}<TIndex>")).open("{");
        writer.line(&format!("public TIndex {};", self.id_field));
        writer.close("}");
        close_namespace(&mut writer, namespace);
        writer.finish()
    }

    fn table_class(&self, namespace: &str, table: &TableSchema) -> String {
        let name = &table.table_name;
        let mut writer = SourceWriter::new();
        writer.line("using System;").blank();
        open_namespace(&mut writer, namespace);

        writer.line("[Serializable]");
        writer.line(&format!("public class D{name} : {BASE_CLASS_NAME}<{}>", table.id_field_type)).open("{");
        for field in table.fields.iter().filter(|field| field.name != self.id_field) {
            // Declared types are already C# spellings
            writer.line(&format!("public {} {};", field.field_type, field.name));
        }
        writer.close("}");
        writer.blank();

        writer.line("[Serializable]");
        writer.line(&format!("public class D{name}List")).open("{");
        writer.line(&format!("public D{name}[] Content;"));
        writer.close("}");

        close_namespace(&mut writer, namespace);
        writer.finish()
    }
}

impl CodeGenerator for CSharpGenerator {
    fn language(&self) -> Language {
        Language::CSharp
    }

    fn generate(&self, namespace: &str, tables: &[TableSchema], out_dir: &Path) -> Result<Vec<PathBuf>, RustyConfigError> {
        let mut paths = vec![write_source(out_dir, BASE_CLASS_FILE, &self.base_class(namespace))?];
        for table in tables {
            let file_name = format!("{}.cs", table.table_name);
            paths.push(write_source(out_dir, &file_name, &self.table_class(namespace, table))?);
        }
        Ok(paths)
    }
}

fn open_namespace(writer: &mut SourceWriter, namespace: &str) {
    if !namespace.is_empty() {
        writer.line(&format!("namespace {namespace}")).open("{");
    }
}

fn close_namespace(writer: &mut SourceWriter, namespace: &str) {
    if !namespace.is_empty() {
        writer.close("}");
    }
}
