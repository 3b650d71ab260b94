//! Wire types for the part of a Google Docs document body that carries the
//! header table. Every field is optional so that unexpected shapes decode
//! instead of failing.

use serde::{Deserialize, Serialize};

use crate::extractor::{CellElement, StructuredBody, TableCells};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    pub document_id: String,
    pub title: String,
    pub body: Body,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Body {
    pub content: Vec<StructuralElement>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuralElement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraph: Option<Paragraph>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Table {
    pub table_rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableRow {
    pub table_cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableCell {
    pub content: Vec<StructuralElement>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Paragraph {
    pub elements: Vec<ParagraphElement>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParagraphElement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_run: Option<TextRun>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<Person>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextRun {
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Person {
    pub person_properties: PersonProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonProperties {
    pub name: String,
    pub email: String,
}

impl TableCell {
    fn first_paragraph(&self) -> Option<&Paragraph> {
        self.content.iter().find_map(|element| element.paragraph.as_ref())
    }
}

impl ParagraphElement {
    fn to_cell_element(&self) -> CellElement {
        if let Some(run) = &self.text_run {
            CellElement::Text(run.content.clone())
        } else if let Some(person) = &self.person {
            CellElement::Person(person.person_properties.name.clone())
        } else {
            CellElement::Other
        }
    }
}

impl StructuredBody for Document {
    fn first_table(&self) -> Option<Vec<TableCells>> {
        let table = self
            .body
            .content
            .iter()
            .find_map(|element| element.table.as_ref())?;

        let rows = table
            .table_rows
            .iter()
            .map(|row| {
                row.table_cells
                    .iter()
                    .map(|cell| {
                        cell.first_paragraph()
                            .map(|p| p.elements.iter().map(|e| e.to_cell_element()).collect())
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect();

        Some(rows)
    }
}
