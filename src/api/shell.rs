//! College-search shell served behind the gate. Search, export and theme
//! behavior live in the front-end scripts; the shell only lays out the
//! controls they attach to.

use crate::gate::{Document, ElementId, Tag};

const CATEGORIES: &[&str] = &["All", "OPEN", "OBC", "SC", "ST", "EWS", "TFWS"];
const QUOTAS: &[&str] = &["All", "Home University", "Other Than Home University", "State Level"];
const BRANCHES: &[&str] = &[
    "All",
    "Computer Engineering",
    "Information Technology",
    "Electronics and Telecommunication Engineering",
    "Mechanical Engineering",
    "Civil Engineering",
];
const RESULT_COLUMNS: &[&str] = &["College", "Branch", "Category", "Quota", "Cutoff Rank"];

#[must_use]
pub fn college_finder(site_name: &str) -> Document {
    let mut doc = Document::new(format!("{site_name} College Finder"));

    let header = doc.append_to_body(Tag::Div);
    doc.set_attribute(header, "class", "header");
    let title = doc.append_child(header, Tag::H1);
    doc.append_text(title, "College Finder");
    let theme = doc.append_child(header, Tag::Button);
    doc.set_attribute(theme, "id", "theme-toggle")
        .set_attribute(theme, "type", "button");
    doc.append_text(theme, "Toggle theme");

    let form = doc.append_to_body(Tag::Form);
    doc.set_attribute(form, "id", "search-form")
        .set_attribute(form, "method", "post")
        .set_attribute(form, "action", "/search");

    let label = doc.append_child(form, Tag::Label);
    doc.append_text(label, "Rank");
    let rank = doc.append_child(form, Tag::Input);
    doc.set_attribute(rank, "type", "number")
        .set_attribute(rank, "name", "rank")
        .set_attribute(rank, "min", "1")
        .set_attribute(rank, "required", "required");

    select(&mut doc, form, "category", CATEGORIES);
    select(&mut doc, form, "quota", QUOTAS);
    select(&mut doc, form, "branch", BRANCHES);

    let search = doc.append_child(form, Tag::Button);
    doc.set_attribute(search, "type", "submit");
    doc.append_text(search, "Find Colleges");

    let export = doc.append_child(form, Tag::Button);
    doc.set_attribute(export, "type", "button")
        .set_attribute(export, "id", "export-results");
    doc.append_text(export, "Export CSV");

    let results = doc.append_to_body(Tag::Div);
    doc.set_attribute(results, "id", "search-results-container");
    let table = doc.append_child(results, Tag::Table);
    let head = doc.append_child(table, Tag::Thead);
    let row = doc.append_child(head, Tag::Tr);
    for column in RESULT_COLUMNS {
        let cell = doc.append_child(row, Tag::Th);
        doc.append_text(cell, column);
    }
    doc.append_child(table, Tag::Tbody);

    doc
}

fn select(doc: &mut Document, form: ElementId, name: &str, options: &[&str]) -> ElementId {
    let select = doc.append_child(form, Tag::Select);
    doc.set_attribute(select, "name", name);
    for value in options {
        let option = doc.append_child(select, Tag::Option);
        doc.set_attribute(option, "value", value);
        doc.append_text(option, value);
    }
    select
}
