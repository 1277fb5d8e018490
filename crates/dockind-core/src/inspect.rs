//! Page geometry and rotation survey
//!
//! Walks the page tree of a PDF with lopdf, reading each page's MediaBox
//! and /Rotate entry (both inheritable from parent nodes), and aggregates
//! them into the shape profile the classifier consumes.

use crate::error::ExtractError;
use lopdf::{Document, Object, ObjectId};
use std::path::Path;

/// Upper bound on parent/reference chains, guards against cyclic files
const MAX_TREE_DEPTH: usize = 64;

/// Geometry and rotation of a single page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRecord {
    /// MediaBox extent along x, truncated to whole points
    pub width: i64,
    /// MediaBox extent along y, truncated to whole points
    pub height: i64,
    /// True when the page carries a non-zero /Rotate angle
    pub rotated: bool,
}

/// Aggregated shape profile of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSurvey {
    pub num_pages: u64,
    /// Mean width over the inspected pages, truncated toward zero
    pub average_width: i64,
    /// Mean height over the inspected pages, truncated toward zero
    pub average_height: i64,
    /// True only when every page is rotated; false for empty documents
    pub all_pages_rotated: bool,
}

/// Survey a PDF on disk.
///
/// `geometry_limit` bounds how many leading pages feed the width and
/// height averages; `None` inspects every page. The page count and the
/// rotation flag always cover the whole document.
pub fn survey_file(
    path: &Path,
    geometry_limit: Option<usize>,
) -> Result<PageSurvey, ExtractError> {
    let doc =
        Document::load(path).map_err(|e| ExtractError::DocumentUnreadable(e.to_string()))?;
    survey_document(&doc, geometry_limit)
}

/// Survey a PDF held in memory
pub fn survey_mem(
    bytes: &[u8],
    geometry_limit: Option<usize>,
) -> Result<PageSurvey, ExtractError> {
    let doc =
        Document::load_mem(bytes).map_err(|e| ExtractError::DocumentUnreadable(e.to_string()))?;
    survey_document(&doc, geometry_limit)
}

/// Per-page geometry records for a PDF held in memory
pub fn page_records(bytes: &[u8]) -> Result<Vec<PageRecord>, ExtractError> {
    let doc =
        Document::load_mem(bytes).map_err(|e| ExtractError::DocumentUnreadable(e.to_string()))?;
    collect_records(&doc)
}

fn survey_document(
    doc: &Document,
    geometry_limit: Option<usize>,
) -> Result<PageSurvey, ExtractError> {
    let records = collect_records(doc)?;
    let num_pages = records.len() as u64;

    if records.is_empty() {
        return Ok(PageSurvey {
            num_pages: 0,
            average_width: 0,
            average_height: 0,
            all_pages_rotated: false,
        });
    }

    let subset = match geometry_limit {
        Some(limit) => &records[..limit.min(records.len())],
        None => &records[..],
    };

    let (average_width, average_height) = if subset.is_empty() {
        (0, 0)
    } else {
        let count = subset.len() as f64;
        let width_sum: i64 = subset.iter().map(|r| r.width).sum();
        let height_sum: i64 = subset.iter().map(|r| r.height).sum();
        (
            (width_sum as f64 / count) as i64,
            (height_sum as f64 / count) as i64,
        )
    };

    Ok(PageSurvey {
        num_pages,
        average_width,
        average_height,
        all_pages_rotated: records.iter().all(|r| r.rotated),
    })
}

fn collect_records(doc: &Document) -> Result<Vec<PageRecord>, ExtractError> {
    doc.get_pages()
        .into_iter()
        .map(|(number, page_id)| page_record(doc, number, page_id))
        .collect()
}

fn page_record(doc: &Document, number: u32, page_id: ObjectId) -> Result<PageRecord, ExtractError> {
    let media_box = inherited_entry(doc, page_id, b"MediaBox")?.ok_or_else(|| {
        ExtractError::DocumentUnreadable(format!("page {} has no MediaBox", number))
    })?;
    let corners = resolve(doc, media_box)?.as_array().map_err(|_| {
        ExtractError::DocumentUnreadable(format!("page {}: MediaBox is not an array", number))
    })?;

    if corners.len() < 4 {
        return Err(ExtractError::DocumentUnreadable(format!(
            "page {}: MediaBox has {} elements, expected 4",
            number,
            corners.len()
        )));
    }

    let mut values = [0.0f32; 4];
    for (slot, corner) in values.iter_mut().zip(corners) {
        *slot = resolve(doc, corner)?.as_float().map_err(|_| {
            ExtractError::DocumentUnreadable(format!(
                "page {}: MediaBox element is not a number",
                number
            ))
        })?;
    }

    let rotation = match inherited_entry(doc, page_id, b"Rotate")? {
        Some(value) => resolve(doc, value)?.as_i64().unwrap_or(0),
        None => 0,
    };

    Ok(PageRecord {
        width: (values[2] - values[0]) as i64,
        height: (values[3] - values[1]) as i64,
        rotated: rotation != 0,
    })
}

/// Look up a page attribute, walking up the page tree for inheritable entries
fn inherited_entry<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, ExtractError> {
    let mut node_id = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_object(node_id).map_err(|e| {
            ExtractError::DocumentUnreadable(format!("invalid page tree node: {}", e))
        })?;
        let dict = node.as_dict().map_err(|_| {
            ExtractError::DocumentUnreadable("page tree node is not a dictionary".to_string())
        })?;

        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }

        match dict.get(b"Parent") {
            Ok(parent) => {
                node_id = parent.as_reference().map_err(|e| {
                    ExtractError::DocumentUnreadable(format!("invalid Parent entry: {}", e))
                })?;
            }
            Err(_) => return Ok(None),
        }
    }

    Err(ExtractError::DocumentUnreadable(
        "page tree exceeds maximum depth".to_string(),
    ))
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Object, ExtractError> {
    let mut current = object;
    for _ in 0..MAX_TREE_DEPTH {
        match current {
            Object::Reference(id) => {
                current = doc.get_object(*id).map_err(|e| {
                    ExtractError::DocumentUnreadable(format!("dangling reference: {}", e))
                })?;
            }
            _ => return Ok(current),
        }
    }
    Err(ExtractError::DocumentUnreadable(
        "reference chain exceeds maximum depth".to_string(),
    ))
}

// Test helper building a PDF from per-page (MediaBox, Rotate) specs. Entries
// set to None are omitted from the page dictionary so they fall back to the
// page tree node built from `tree_box` / `tree_rotate`.
#[cfg(test)]
pub(crate) fn build_tree_pdf(
    pages: &[(Option<[f32; 4]>, Option<i64>)],
    tree_box: Option<[f32; 4]>,
    tree_rotate: Option<i64>,
) -> Vec<u8> {
    use lopdf::dictionary;

    fn rect(corners: &[f32; 4]) -> Object {
        Object::Array(corners.iter().map(|v| (*v).into()).collect())
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::new();
    for (media_box, rotate) in pages {
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        };
        if let Some(corners) = media_box {
            page.set("MediaBox", rect(corners));
        }
        if let Some(angle) = rotate {
            page.set("Rotate", *angle);
        }
        kids.push(doc.add_object(page).into());
    }

    let mut pages_dict = dictionary! {
        "Type" => "Pages",
        "Count" => pages.len() as i64,
        "Kids" => kids,
    };
    if let Some(corners) = tree_box {
        pages_dict.set("MediaBox", rect(&corners));
    }
    if let Some(angle) = tree_rotate {
        pages_dict.set("Rotate", angle);
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

#[cfg(test)]
pub(crate) fn build_test_pdf(pages: &[(Option<[f32; 4]>, Option<i64>)]) -> Vec<u8> {
    build_tree_pdf(pages, None, None)
}


// Property tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: averages equal the integer-truncated means of per-page extents
        #[test]
        fn survey_truncates_mean_dimensions(
            dims in prop::collection::vec((100i64..2000, 100i64..2000), 1..8)
        ) {
            let pages: Vec<(Option<[f32; 4]>, Option<i64>)> = dims
                .iter()
                .map(|(w, h)| (Some([0.0, 0.0, *w as f32, *h as f32]), None))
                .collect();
            let survey = survey_mem(&build_test_pdf(&pages), None).unwrap();

            let count = dims.len() as f64;
            let width_sum: i64 = dims.iter().map(|(w, _)| *w).sum();
            let height_sum: i64 = dims.iter().map(|(_, h)| *h).sum();
            prop_assert_eq!(survey.num_pages, dims.len() as u64);
            prop_assert_eq!(survey.average_width, (width_sum as f64 / count) as i64);
            prop_assert_eq!(survey.average_height, (height_sum as f64 / count) as i64);
        }

        /// Property: the flag holds only when every page has a non-zero angle
        #[test]
        fn rotation_flag_matches_all_pages(
            angles in prop::collection::vec(prop_oneof![Just(0i64), Just(90), Just(180), Just(270)], 1..8)
        ) {
            let pages: Vec<(Option<[f32; 4]>, Option<i64>)> = angles
                .iter()
                .map(|angle| (Some([0.0, 0.0, 612.0, 792.0]), Some(*angle)))
                .collect();
            let survey = survey_mem(&build_test_pdf(&pages), None).unwrap();
            prop_assert_eq!(survey.all_pages_rotated, angles.iter().all(|a| *a != 0));
        }
    }
}
