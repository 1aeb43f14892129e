//! Stamp fonts
//!
//! A stamp is drawn either with a TrueType font fetched at runtime
//! or with the built-in Helvetica. Both measure text the same way the viewer
//! will lay it out, and both know how to put themselves into a document.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::io::Write;

use flate2::{write::ZlibEncoder, Compression};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use owned_ttf_parser::{AsFaceRef, GlyphId, OwnedFace};
use subsetter::GlyphRemapper;
use tracing::debug;

use crate::error::StampError;

/// Font used to draw the stamp text
pub enum StampFont {
    /// Standard 14 Helvetica with WinAnsiEncoding, never embedded
    Helvetica,
    /// Font program subset to the stamped glyphs, embedded as a CIDFontType2
    TrueType(TrueTypeFont),
}

impl StampFont {
    /// Parse font bytes, returning an error if they are not a usable font
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, StampError> {
        TrueTypeFont::load(bytes).map(StampFont::TrueType)
    }

    /// Name used in logs
    pub fn name(&self) -> &str {
        match self {
            StampFont::Helvetica => "Helvetica",
            StampFont::TrueType(font) => &font.postscript_name,
        }
    }

    /// Width of `text` in points at `size`
    pub fn text_width(&self, text: &str, size: f64) -> Result<f64, StampError> {
        let units: u64 = match self {
            StampFont::Helvetica => encode_win_ansi(text)?
                .into_iter()
                .map(|byte| u64::from(helvetica_width(byte)))
                .sum(),
            StampFont::TrueType(font) => return Ok(font.text_width(text, size)),
        };
        Ok(units as f64 * size / 1000.0)
    }

    /// Encode `text` as the operand of a `Tj` operator
    pub fn encode_text(&self, text: &str) -> Result<Object, StampError> {
        let bytes = match self {
            StampFont::Helvetica => encode_win_ansi(text)?,
            StampFont::TrueType(font) => font.encode(text),
        };
        Ok(Object::String(bytes, StringFormat::Hexadecimal))
    }

    /// Add the font objects to `doc` and return the font dictionary id.
    /// `text` decides which glyphs get widths and ToUnicode entries.
    pub fn embed(&self, doc: &mut Document, text: &str) -> Result<ObjectId, StampError> {
        match self {
            StampFont::Helvetica => Ok(doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
                "Encoding" => "WinAnsiEncoding",
            })),
            StampFont::TrueType(font) => font.embed(doc, text),
        }
    }
}

/// A parsed TrueType font with `glyf` outlines
pub struct TrueTypeFont {
    face: OwnedFace,
    postscript_name: String,
}

/// Glyphs drawn by one stamp, renumbered for the embedded subset.
/// CIDs are the subset's glyph ids, so `CIDToGIDMap` stays `Identity`.
struct GlyphSubset {
    remapper: GlyphRemapper,
    /// One CID per char of the text
    cids: Vec<u16>,
    /// CID -> (original glyph id, first char drawn with it)
    used: BTreeMap<u16, (GlyphId, char)>,
}

impl TrueTypeFont {
    pub fn load(bytes: Vec<u8>) -> Result<Self, StampError> {
        if owned_ttf_parser::fonts_in_collection(&bytes).is_some() {
            return Err(StampError::FontError("font collections are not supported".into()));
        }

        let face = OwnedFace::from_vec(bytes, 0).map_err(|e| StampError::FontError(e.to_string()))?;

        if face.as_face_ref().units_per_em() == 0 {
            return Err(StampError::FontError("units per em is zero".into()));
        }
        // CFF and CFF2 flavoured OpenType can't be embedded as FontFile2
        if face.as_face_ref().tables().glyf.is_none() {
            return Err(StampError::FontError("font has no TrueType outlines".into()));
        }

        let postscript_name = face
            .as_face_ref()
            .names()
            .into_iter()
            .find(|name| {
                name.name_id == owned_ttf_parser::name_id::POST_SCRIPT_NAME && name.is_unicode()
            })
            .and_then(|name| name.to_string())
            .map(|name| sanitize_font_name(&name))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "StampFont".to_string());

        Ok(Self {
            face,
            postscript_name,
        })
    }

    fn units_per_em(&self) -> f64 {
        f64::from(self.face.as_face_ref().units_per_em())
    }

    /// Glyph ids for each char; unmapped chars become `.notdef`
    fn glyphs(&self, text: &str) -> Vec<GlyphId> {
        let face = self.face.as_face_ref();
        text.chars()
            .map(|ch| face.glyph_index(ch).unwrap_or(GlyphId(0)))
            .collect()
    }

    fn advance(&self, gid: GlyphId) -> u16 {
        self.face.as_face_ref().glyph_hor_advance(gid).unwrap_or(0)
    }

    fn text_width(&self, text: &str, size: f64) -> f64 {
        let units: u64 = self
            .glyphs(text)
            .into_iter()
            .map(|gid| u64::from(self.advance(gid)))
            .sum();
        units as f64 * size / self.units_per_em()
    }

    /// Scale font units to the 1000-unit glyph space
    fn scaled(&self, value: f64) -> f64 {
        value * 1000.0 / self.units_per_em()
    }

    /// Renumber the glyphs of `text` in order of first use, `.notdef` first
    fn subset(&self, text: &str) -> GlyphSubset {
        let mut remapper = GlyphRemapper::new();
        remapper.remap(0);

        let mut cids = Vec::new();
        let mut used = BTreeMap::new();
        for (gid, ch) in self.glyphs(text).into_iter().zip(text.chars()) {
            let cid = remapper.remap(gid.0);
            cids.push(cid);
            used.entry(cid).or_insert((gid, ch));
        }

        GlyphSubset {
            remapper,
            cids,
            used,
        }
    }

    fn encode(&self, text: &str) -> Vec<u8> {
        self.subset(text)
            .cids
            .into_iter()
            .flat_map(u16::to_be_bytes)
            .collect()
    }

    fn embed(&self, doc: &mut Document, text: &str) -> Result<ObjectId, StampError> {
        let face = self.face.as_face_ref();
        let subset = self.subset(text);
        let base_font = format!("{}+{}", subset_tag(&subset), self.postscript_name);

        let font_file_id = self.write_font_file(doc, &subset)?;

        let bbox = face.global_bounding_box();
        let mut flags: i64 = 1 << 5; // Nonsymbolic
        if face.is_monospaced() {
            flags |= 1;
        }
        if face.is_italic() {
            flags |= 1 << 6;
        }
        let cap_height = face.capital_height().unwrap_or(face.ascender());

        let descriptor_id = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => Object::Name(base_font.as_bytes().to_vec()),
            "Flags" => flags,
            "FontBBox" => vec![
                Object::Real(self.scaled(f64::from(bbox.x_min)) as f32),
                Object::Real(self.scaled(f64::from(bbox.y_min)) as f32),
                Object::Real(self.scaled(f64::from(bbox.x_max)) as f32),
                Object::Real(self.scaled(f64::from(bbox.y_max)) as f32),
            ],
            "ItalicAngle" => 0,
            "Ascent" => Object::Real(self.scaled(f64::from(face.ascender())) as f32),
            "Descent" => Object::Real(self.scaled(f64::from(face.descender())) as f32),
            "CapHeight" => Object::Real(self.scaled(f64::from(cap_height)) as f32),
            "StemV" => 80,
            "FontFile2" => Object::Reference(font_file_id),
        });

        let widths: Vec<Object> = subset
            .used
            .iter()
            .flat_map(|(&cid, &(gid, _))| {
                let width = self.scaled(f64::from(self.advance(gid)));
                [
                    Object::Integer(i64::from(cid)),
                    Object::Array(vec![Object::Real(width as f32)]),
                ]
            })
            .collect();

        let cid_font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => Object::Name(base_font.as_bytes().to_vec()),
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => 0,
            },
            "FontDescriptor" => Object::Reference(descriptor_id),
            "DW" => 1000,
            "W" => widths,
            "CIDToGIDMap" => "Identity",
        });

        let chars: BTreeMap<u16, char> = subset
            .used
            .iter()
            .map(|(&cid, &(_, ch))| (cid, ch))
            .collect();
        let to_unicode_id = doc.add_object(Stream::new(
            Dictionary::new(),
            to_unicode_cmap(&chars).into_bytes(),
        ));

        Ok(doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => Object::Name(base_font.into_bytes()),
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(cid_font_id)],
            "ToUnicode" => Object::Reference(to_unicode_id),
        }))
    }

    /// Embed only the glyphs in `subset`, renumbered to match its CIDs
    fn write_font_file(
        &self,
        doc: &mut Document,
        subset: &GlyphSubset,
    ) -> Result<ObjectId, StampError> {
        let program = subsetter::subset(self.face.as_slice(), 0, &subset.remapper)
            .map_err(|e| StampError::FontError(format!("subsetting failed: {:?}", e)))?;
        debug!(
            "Subset {} to {} glyphs ({} of {} bytes)",
            self.postscript_name,
            subset.used.len(),
            program.len(),
            self.face.as_slice().len()
        );

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(&program)
            .map_err(|e| StampError::OperationError(e.to_string()))?;
        let compressed = encoder
            .finish()
            .map_err(|e| StampError::OperationError(e.to_string()))?;

        let dict = dictionary! {
            "Length1" => program.len() as i64,
            "Filter" => "FlateDecode",
        };
        Ok(doc.add_object(Stream::new(dict, compressed)))
    }
}

/// Six uppercase letters naming a subset, derived from its glyphs
fn subset_tag(subset: &GlyphSubset) -> String {
    let mut hasher = DefaultHasher::new();
    for &(gid, _) in subset.used.values() {
        gid.0.hash(&mut hasher);
    }
    let mut hash = hasher.finish();
    (0..6)
        .map(|_| {
            let letter = b'A' + (hash % 26) as u8;
            hash /= 26;
            char::from(letter)
        })
        .collect()
}

/// PDF names can't carry whitespace or delimiters
fn sanitize_font_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_graphic() && !"()<>[]{}/%#".contains(*c))
        .collect()
}

fn to_unicode_cmap(used: &BTreeMap<u16, char>) -> String {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );

    let entries: Vec<(&u16, &char)> = used.iter().filter(|(gid, _)| **gid != 0).collect();
    // bfchar blocks are limited to 100 entries
    for chunk in entries.chunks(100) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (gid, ch) in chunk {
            let mut units = [0u16; 2];
            let utf16: String = ch
                .encode_utf16(&mut units)
                .iter()
                .map(|unit| format!("{:04X}", unit))
                .collect();
            cmap.push_str(&format!("<{:04X}> <{}>\n", gid, utf16));
        }
        cmap.push_str("endbfchar\n");
    }

    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    cmap
}

/// Map text onto WinAnsiEncoding bytes
pub fn encode_win_ansi(text: &str) -> Result<Vec<u8>, StampError> {
    text.chars()
        .map(|ch| {
            win_ansi_byte(ch).ok_or(StampError::EncodingError {
                ch,
                code: u32::from(ch),
            })
        })
        .collect()
}

fn win_ansi_byte(ch: char) -> Option<u8> {
    let code = u32::from(ch);
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => match ch {
            '€' => Some(0x80),
            '‚' => Some(0x82),
            'ƒ' => Some(0x83),
            '„' => Some(0x84),
            '…' => Some(0x85),
            '†' => Some(0x86),
            '‡' => Some(0x87),
            'ˆ' => Some(0x88),
            '‰' => Some(0x89),
            'Š' => Some(0x8A),
            '‹' => Some(0x8B),
            'Œ' => Some(0x8C),
            'Ž' => Some(0x8E),
            '\u{2018}' => Some(0x91),
            '\u{2019}' => Some(0x92),
            '\u{201C}' => Some(0x93),
            '\u{201D}' => Some(0x94),
            '•' => Some(0x95),
            '–' => Some(0x96),
            '—' => Some(0x97),
            '˜' => Some(0x98),
            '™' => Some(0x99),
            'š' => Some(0x9A),
            '›' => Some(0x9B),
            'œ' => Some(0x9C),
            'ž' => Some(0x9E),
            'Ÿ' => Some(0x9F),
            _ => None,
        },
    }
}

/// Helvetica AFM advance widths for the printable ASCII range, from space (0x20)
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0x30
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 0x40
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 0x50
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 0x60
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 0x70
];

/// Helvetica AFM advance widths for WinAnsi 0xA0..=0xFF
const HELVETICA_LATIN1: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xA0
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xB0
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 0xC0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 0xD0
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // 0xE0
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // 0xF0
];

fn helvetica_width(byte: u8) -> u16 {
    match byte {
        0x20..=0x7E => HELVETICA_ASCII[usize::from(byte - 0x20)],
        0xA0..=0xFF => HELVETICA_LATIN1[usize::from(byte - 0xA0)],
        0x80 => 556,
        0x82 | 0x91 | 0x92 => 222,
        0x83 | 0x86 | 0x87 | 0x96 => 556,
        0x84 | 0x88 | 0x8B | 0x93 | 0x94 | 0x98 | 0x9B => 333,
        0x85 | 0x89 | 0x8C | 0x97 | 0x99 => 1000,
        0x8A | 0x9F => 667,
        0x8E => 611,
        0x95 => 350,
        0x9A | 0x9E => 500,
        0x9C => 944,
        _ => 556,
    }
}
