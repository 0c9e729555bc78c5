//! Markup builders shared by the unit tests

use doc_xml::W_NAMESPACE;
use quick_xml::escape::{escape, partial_escape};

pub fn body(content: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <w:document xmlns:w=\"{}\"><w:body>{}</w:body></w:document>",
        W_NAMESPACE, content
    )
}

/// A run with optional run properties and one text element
pub fn run(properties: &str, text: &str) -> String {
    let properties = if properties.is_empty() {
        String::new()
    } else {
        format!("<w:rPr>{}</w:rPr>", properties)
    };
    format!("<w:r>{}<w:t>{}</w:t></w:r>", properties, partial_escape(text))
}

pub fn simple_field(instruction: &str, content: &str) -> String {
    format!(
        "<w:fldSimple w:instr=\"{}\">{}</w:fldSimple>",
        escape(instruction),
        content
    )
}

pub fn complex_field(instruction: &str, result: &str) -> String {
    format!(
        "<w:r><w:fldChar w:fldCharType=\"begin\"/></w:r>\
         <w:r><w:instrText xml:space=\"preserve\">{}</w:instrText></w:r>\
         <w:r><w:fldChar w:fldCharType=\"separate\"/></w:r>\
         {}\
         <w:r><w:fldChar w:fldCharType=\"end\"/></w:r>",
        partial_escape(instruction),
        result
    )
}
