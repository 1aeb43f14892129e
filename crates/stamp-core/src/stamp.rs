//! Stamp text onto the first page of a PDF

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

use crate::error::StampError;
use crate::font::StampFont;
use crate::position::{resolve_position, Anchor, PageGeometry, Position, TextMetrics};

/// Guards against cyclic `Parent` chains in broken page trees
const MAX_TREE_DEPTH: usize = 64;

/// What to draw
#[derive(Debug, Clone)]
pub struct StampRequest {
    pub text: String,
    pub anchor: Anchor,
    pub font_size: f64,
}

/// Result of a successful stamp
#[derive(Debug, Clone)]
pub struct StampedPdf {
    pub bytes: Vec<u8>,
    pub page: PageGeometry,
    pub text_width: f64,
    pub position: Position,
}

/// Draw `request.text` in black on the first page and save the document.
///
/// Encrypted documents are edited as-is rather than rejected.
pub fn stamp_first_page(
    pdf_bytes: &[u8],
    font: &StampFont,
    request: &StampRequest,
    margin: f64,
) -> Result<StampedPdf, StampError> {
    let mut doc =
        Document::load_mem(pdf_bytes).map_err(|e| StampError::ParseError(e.to_string()))?;

    if doc.trailer.get(b"Encrypt").is_ok() {
        debug!("Source PDF is encrypted, stamping without decryption");
    }

    let page_id = doc
        .get_pages()
        .values()
        .next()
        .copied()
        .ok_or(StampError::NoPages)?;

    let page = page_geometry(&doc, page_id)?;
    let text_width = font.text_width(&request.text, request.font_size)?;
    let position = resolve_position(
        page,
        TextMetrics::new(text_width, request.font_size),
        &request.anchor,
        margin,
    );
    debug!(
        "Stamping {:?} at ({:.2}, {:.2}) on {}x{} page with {}",
        request.text,
        position.x,
        position.y,
        page.width,
        page.height,
        font.name()
    );

    let size = pdf_real(request.font_size)?;
    let x = pdf_real(position.x)?;
    let y = pdf_real(position.y)?;

    let operand = font.encode_text(&request.text)?;
    let font_id = font.embed(&mut doc, &request.text)?;
    let font_key = register_font(&mut doc, page_id, font_id)?;

    let content = Content {
        operations: vec![
            Operation::new("Q", vec![]),
            Operation::new("q", vec![]),
            Operation::new("BT", vec![]),
            Operation::new("rg", vec![0.into(), 0.into(), 0.into()]),
            Operation::new(
                "Tf",
                vec![Object::Name(font_key.into_bytes()), size],
            ),
            Operation::new("Td", vec![x, y]),
            Operation::new("Tj", vec![operand]),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ],
    };
    let stamp = content
        .encode()
        .map_err(|e| StampError::OperationError(e.to_string()))?;
    wrap_page_contents(&mut doc, page_id, stamp)?;

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| StampError::OperationError(e.to_string()))?;

    Ok(StampedPdf {
        bytes,
        page,
        text_width,
        position,
    })
}

/// Content stream operand for `value`; PDF reals are single precision
fn pdf_real(value: f64) -> Result<Object, StampError> {
    let real = value as f32;
    if !real.is_finite() {
        return Err(StampError::GeometryError(format!(
            "{} does not fit in a PDF real",
            value
        )));
    }
    Ok(Object::Real(real))
}

/// Width and height of the page's MediaBox, inherited if necessary
pub fn page_geometry(doc: &Document, page_id: ObjectId) -> Result<PageGeometry, StampError> {
    let media_box = inherited_attribute(doc, page_id, b"MediaBox")?
        .ok_or_else(|| StampError::GeometryError("page has no MediaBox".into()))?;

    let values = media_box
        .as_array()
        .map_err(|e| StampError::GeometryError(e.to_string()))?
        .iter()
        .map(|value| resolve(doc, value).and_then(as_number))
        .collect::<Result<Vec<f64>, StampError>>()?;

    match values.as_slice() {
        [x1, y1, x2, y2] => Ok(PageGeometry {
            width: x2 - x1,
            height: y2 - y1,
        }),
        other => Err(StampError::GeometryError(format!(
            "MediaBox has {} entries",
            other.len()
        ))),
    }
}

fn as_number(value: &Object) -> Result<f64, StampError> {
    match value {
        Object::Integer(i) => Ok(*i as f64),
        Object::Real(r) => Ok(f64::from(*r)),
        other => Err(StampError::GeometryError(format!(
            "expected a number, found {:?}",
            other
        ))),
    }
}

fn resolve<'a>(doc: &'a Document, value: &'a Object) -> Result<&'a Object, StampError> {
    match value {
        Object::Reference(id) => doc
            .get_object(*id)
            .map_err(|e| StampError::OperationError(e.to_string())),
        other => Ok(other),
    }
}

/// Look `key` up on the page, then up the `Parent` chain
fn inherited_attribute(
    doc: &Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<Object>, StampError> {
    let mut node_id = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let node = doc
            .get_dictionary(node_id)
            .map_err(|e| StampError::OperationError(e.to_string()))?;

        if let Ok(value) = node.get(key) {
            return resolve(doc, value).map(|v| Some(v.clone()));
        }

        match node.get(b"Parent").and_then(|parent| parent.as_reference()) {
            Ok(parent_id) => node_id = parent_id,
            Err(_) => return Ok(None),
        }
    }
    Ok(None)
}

/// Give the page its own Resources with the stamp font added.
/// Returns the resource name the font was registered under.
fn register_font(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
) -> Result<String, StampError> {
    let mut resources = match inherited_attribute(doc, page_id, b"Resources")? {
        Some(Object::Dictionary(dict)) => dict,
        _ => Dictionary::new(),
    };

    let mut fonts = match resources.get(b"Font") {
        Ok(value) => match resolve(doc, value)? {
            Object::Dictionary(dict) => dict.clone(),
            _ => Dictionary::new(),
        },
        Err(_) => Dictionary::new(),
    };

    let mut index = 0;
    let key = loop {
        let candidate = format!("StampF{}", index);
        if !fonts.has(candidate.as_bytes()) {
            break candidate;
        }
        index += 1;
    };

    fonts.set(key.clone(), Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    doc.get_dictionary_mut(page_id)
        .map_err(|e| StampError::OperationError(e.to_string()))?
        .set("Resources", Object::Dictionary(resources));

    Ok(key)
}

/// Wrap existing page content in `q`/`Q` and append `stamp` after it.
/// `stamp` is expected to open with the closing `Q`.
fn wrap_page_contents(
    doc: &mut Document,
    page_id: ObjectId,
    stamp: Vec<u8>,
) -> Result<(), StampError> {
    let existing: Vec<Object> = {
        let page = doc
            .get_dictionary(page_id)
            .map_err(|e| StampError::OperationError(e.to_string()))?;
        match page.get(b"Contents") {
            Ok(Object::Reference(id)) => match doc.get_object(*id) {
                Ok(Object::Array(items)) => items.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(Object::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    };

    // Streams are concatenated when rendered; keep a token boundary in front
    let mut stamp_stream = b"\n".to_vec();
    stamp_stream.extend(stamp);

    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let stamp_id = doc.add_object(Stream::new(Dictionary::new(), stamp_stream));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(save_id));
    contents.extend(existing);
    contents.push(Object::Reference(stamp_id));

    doc.get_dictionary_mut(page_id)
        .map_err(|e| StampError::OperationError(e.to_string()))?
        .set("Contents", Object::Array(contents));

    Ok(())
}
