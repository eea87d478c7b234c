//! EPUB package reading: zip container, OPF manifest and spine.
//!
//! The archive is held in memory. Entries are located through the central
//! directory and inflated with `miniz_oxide`; package XML is read with
//! `quick_xml`, and spine documents are handed to the markup extractor in
//! reading order.

use std::borrow::Cow;

use log::debug;
use miniz_oxide::inflate::decompress_to_vec_with_limit;
use quick_xml::{
    encoding::Decoder,
    events::{BytesStart, Event},
    reader::Reader,
};

use super::scan::{ends_with_ascii_case_insensitive, eq_ascii_case_insensitive};
use crate::error::IngestError;

const ZIP_EOCD_SIG: [u8; 4] = *b"PK\x05\x06";
const ZIP_CDIR_SIG: [u8; 4] = *b"PK\x01\x02";
const ZIP_LOCAL_SIG: [u8; 4] = *b"PK\x03\x04";
const ZIP_EOCD_MIN_BYTES: usize = 22;
const ZIP_CDIR_HEADER_BYTES: usize = 46;
const ZIP_LOCAL_HEADER_BYTES: usize = 30;
const ZIP_METHOD_STORED: u16 = 0;
const ZIP_METHOD_DEFLATED: u16 = 8;
/// Upper bound for one inflated entry.
const ZIP_ENTRY_MAX_BYTES: usize = 64 * 1024 * 1024;

const CONTAINER_PATH: &[u8] = b"META-INF/container.xml";
const ENCRYPTION_PATH: &[u8] = b"META-INF/encryption.xml";
/// Font mangling schemes from the IDPF and Adobe; they only hide embedded
/// fonts and never the text.
const FONT_OBFUSCATION_ALGORITHMS: [&str; 2] = [
    "http://www.idpf.org/2008/embedding",
    "http://ns.adobe.com/pdf/enc#RC",
];

fn read_u16_le(bytes: &[u8], offset: usize) -> Option<u16> {
    let raw = bytes.get(offset..offset + 2)?;
    Some(u16::from_le_bytes([raw[0], raw[1]]))
}

fn read_u32_le(bytes: &[u8], offset: usize) -> Option<u32> {
    let raw = bytes.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

#[derive(Clone, Copy, Debug)]
struct ZipEntry<'a> {
    name: &'a [u8],
    compression: u16,
    compressed_size: usize,
    local_header_offset: usize,
}

struct ZipArchive<'a> {
    bytes: &'a [u8],
    entries: Vec<ZipEntry<'a>>,
}

impl<'a> ZipArchive<'a> {
    fn parse(bytes: &'a [u8]) -> Option<Self> {
        if bytes.len() < ZIP_EOCD_MIN_BYTES {
            return None;
        }
        let eocd = (0..=bytes.len() - ZIP_EOCD_MIN_BYTES)
            .rev()
            .find(|offset| bytes[*offset..].starts_with(&ZIP_EOCD_SIG))?;

        let entry_count = read_u16_le(bytes, eocd + 10)? as usize;
        let mut cursor = read_u32_le(bytes, eocd + 16)? as usize;

        let mut entries = Vec::with_capacity(entry_count);
        for _ in 0..entry_count {
            let header = bytes.get(cursor..cursor + ZIP_CDIR_HEADER_BYTES)?;
            if !header.starts_with(&ZIP_CDIR_SIG) {
                break;
            }

            let name_len = read_u16_le(header, 28)? as usize;
            let extra_len = read_u16_le(header, 30)? as usize;
            let comment_len = read_u16_le(header, 32)? as usize;
            let name_start = cursor + ZIP_CDIR_HEADER_BYTES;

            entries.push(ZipEntry {
                name: bytes.get(name_start..name_start + name_len)?,
                compression: read_u16_le(header, 10)?,
                compressed_size: read_u32_le(header, 20)? as usize,
                local_header_offset: read_u32_le(header, 42)? as usize,
            });

            cursor = name_start
                .checked_add(name_len)?
                .checked_add(extra_len)?
                .checked_add(comment_len)?;
        }

        Some(Self { bytes, entries })
    }

    fn find(&self, path: &[u8]) -> Option<&ZipEntry<'a>> {
        self.entries
            .iter()
            .find(|entry| eq_ascii_case_insensitive(entry.name, path))
    }

    fn read(&self, entry: &ZipEntry<'_>) -> Option<Cow<'a, [u8]>> {
        let local = entry.local_header_offset;
        let header = self.bytes.get(local..local + ZIP_LOCAL_HEADER_BYTES)?;
        if !header.starts_with(&ZIP_LOCAL_SIG) {
            return None;
        }

        let name_len = read_u16_le(header, 26)? as usize;
        let extra_len = read_u16_le(header, 28)? as usize;
        let data_start = local
            .checked_add(ZIP_LOCAL_HEADER_BYTES)?
            .checked_add(name_len)?
            .checked_add(extra_len)?;
        let compressed = self
            .bytes
            .get(data_start..data_start.checked_add(entry.compressed_size)?)?;

        match entry.compression {
            ZIP_METHOD_STORED => Some(Cow::Borrowed(compressed)),
            ZIP_METHOD_DEFLATED => decompress_to_vec_with_limit(compressed, ZIP_ENTRY_MAX_BYTES)
                .map(Cow::Owned)
                .map_err(|err| debug!("epub: inflate fail status={:?}", err.status))
                .ok(),
            other => {
                debug!("epub: unsupported compression method={other}");
                None
            }
        }
    }

    fn read_path(&self, path: &[u8]) -> Option<Cow<'a, [u8]>> {
        self.read(self.find(path)?)
    }
}

/// One XML element: lowercased local name and attributes keyed by
/// lowercased local name.
#[derive(Debug)]
struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
}

impl XmlElement {
    fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.trim())
    }
}

#[derive(Debug)]
enum XmlNode {
    Open(XmlElement),
    Close(String),
}

/// Element open/close events of a package XML document. Parsing stops at the
/// first syntax error; everything read up to it is kept.
fn xml_nodes(xml: &[u8]) -> Vec<XmlNode> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut nodes = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                nodes.push(XmlNode::Open(xml_element(reader.decoder(), &start)));
            }
            Ok(Event::Empty(start)) => {
                let element = xml_element(reader.decoder(), &start);
                let name = element.name.clone();
                nodes.push(XmlNode::Open(element));
                nodes.push(XmlNode::Close(name));
            }
            Ok(Event::End(end)) => {
                let name = local_name(reader.decoder(), end.local_name().as_ref());
                nodes.push(XmlNode::Close(name));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                debug!(
                    "epub: xml parse stopped pos={} err={}",
                    reader.buffer_position(),
                    err
                );
                break;
            }
        }
    }
    nodes
}

fn xml_element(decoder: Decoder, start: &BytesStart<'_>) -> XmlElement {
    let attributes = start
        .attributes()
        .flatten()
        .filter_map(|attr| {
            let key = local_name(decoder, attr.key.local_name().as_ref());
            let value = attr.decode_and_unescape_value(decoder).ok()?;
            Some((key, value.into_owned()))
        })
        .collect();

    XmlElement {
        name: local_name(decoder, start.local_name().as_ref()),
        attributes,
    }
}

fn local_name(decoder: Decoder, raw: &[u8]) -> String {
    decoder
        .decode(raw)
        .map(|name| name.to_ascii_lowercase())
        .unwrap_or_default()
}

fn opened(nodes: &[XmlNode]) -> impl Iterator<Item = &XmlElement> {
    nodes.iter().filter_map(|node| match node {
        XmlNode::Open(element) => Some(element),
        XmlNode::Close(_) => None,
    })
}

/// OPF path named by `META-INF/container.xml`, else the first `.opf` entry.
fn locate_package(archive: &ZipArchive<'_>) -> Option<String> {
    let from_container = archive.read_path(CONTAINER_PATH).and_then(|container| {
        opened(&xml_nodes(&container))
            .filter(|element| element.name == "rootfile")
            .find_map(|element| element.attr("full-path").map(str::to_owned))
    });

    from_container
        .filter(|path| archive.find(path.as_bytes()).is_some())
        .or_else(|| {
            archive
                .entries
                .iter()
                .find(|entry| ends_with_ascii_case_insensitive(entry.name, b".opf"))
                .map(|entry| String::from_utf8_lossy(entry.name).into_owned())
        })
}

/// Archive paths of the spine documents, in reading order.
fn spine_paths(opf: &[u8], opf_path: &str) -> Vec<String> {
    let nodes = xml_nodes(opf);
    let manifest: Vec<(&str, &str)> = opened(&nodes)
        .filter(|element| element.name == "item")
        .filter_map(|element| Some((element.attr("id")?, element.attr("href")?)))
        .collect();

    let mut paths = Vec::new();
    for idref in opened(&nodes)
        .filter(|element| element.name == "itemref")
        .filter_map(|element| element.attr("idref"))
    {
        let Some((_, href)) = manifest.iter().find(|(id, _)| *id == idref) else {
            debug!("epub: spine idref missing from manifest idref={idref}");
            continue;
        };
        if let Some(path) = resolve_href(opf_path, href) {
            paths.push(path);
        }
    }

    paths
}

/// One `EncryptedData` record of `META-INF/encryption.xml`.
#[derive(Debug, Default)]
struct EncryptedResource {
    algorithm: Option<String>,
    uri: Option<String>,
}

impl EncryptedResource {
    fn is_obfuscated_font(&self) -> bool {
        self.algorithm
            .as_deref()
            .is_some_and(|algorithm| FONT_OBFUSCATION_ALGORITHMS.contains(&algorithm))
    }

    /// Archive path of the encrypted entry; URIs are relative to the root.
    fn path(&self) -> Option<String> {
        resolve_href("", self.uri.as_deref()?)
    }
}

fn encrypted_resources(xml: &[u8]) -> Vec<EncryptedResource> {
    let mut resources = Vec::new();
    let mut current: Option<EncryptedResource> = None;

    for node in xml_nodes(xml) {
        match node {
            XmlNode::Open(element) if element.name == "encrypteddata" => {
                current = Some(EncryptedResource::default());
            }
            XmlNode::Open(element) => {
                let Some(resource) = current.as_mut() else {
                    continue;
                };
                match element.name.as_str() {
                    // Nested key-wrapping methods come later; the first one names the data cipher.
                    "encryptionmethod" if resource.algorithm.is_none() => {
                        resource.algorithm = element.attr("algorithm").map(str::to_owned);
                    }
                    "cipherreference" => resource.uri = element.attr("uri").map(str::to_owned),
                    _ => {}
                }
            }
            XmlNode::Close(name) if name == "encrypteddata" => resources.extend(current.take()),
            XmlNode::Close(_) => {}
        }
    }

    resources
}

/// Whether `encryption.xml` locks the text: any real cipher, or any
/// encrypted spine document. Obfuscated fonts alone leave the book readable.
fn text_is_encrypted(encryption: &[u8], spine: &[String]) -> bool {
    encrypted_resources(encryption).iter().any(|resource| {
        let path = resource.path();
        let in_spine = path
            .as_deref()
            .is_some_and(|path| spine.iter().any(|item| item.eq_ignore_ascii_case(path)));
        let locked = in_spine || !resource.is_obfuscated_font();
        if locked {
            debug!(
                "epub: encrypted resource path={:?} algorithm={:?}",
                path, resource.algorithm
            );
        }
        locked
    })
}

/// Resolve a manifest `href` against the OPF directory, dropping fragments
/// and `.`/`..` segments.
fn resolve_href(opf_path: &str, href: &str) -> Option<String> {
    let href = href.split(['#', '?']).next().unwrap_or_default().trim();
    if href.is_empty() {
        return None;
    }
    let href = percent_decode(href);

    let base_dir = match opf_path.rsplit_once('/') {
        Some((dir, _)) if !href.starts_with('/') => dir,
        _ => "",
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in base_dir.split('/').chain(href.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }

    (!segments.is_empty()).then(|| segments.join("/"))
}

fn percent_decode(source: &str) -> Cow<'_, str> {
    if !source.contains('%') {
        return Cow::Borrowed(source);
    }

    let bytes = source.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut idx = 0usize;
    while idx < bytes.len() {
        let escaped = (bytes[idx] == b'%')
            .then(|| bytes.get(idx + 1..idx + 3))
            .flatten()
            .and_then(|hex| u8::from_str_radix(std::str::from_utf8(hex).ok()?, 16).ok());
        match escaped {
            Some(byte) => {
                out.push(byte);
                idx += 3;
            }
            None => {
                out.push(bytes[idx]);
                idx += 1;
            }
        }
    }
    Cow::Owned(String::from_utf8_lossy(&out).into_owned())
}

/// Spine documents of an EPUB archive, as raw markup bytes.
pub(super) fn spine_documents(bytes: &[u8]) -> Result<Vec<Vec<u8>>, IngestError> {
    let archive = ZipArchive::parse(bytes).ok_or_else(|| {
        debug!("epub: no central directory bytes={}", bytes.len());
        IngestError::ProtectedContent
    })?;

    let opf_path = locate_package(&archive).ok_or_else(|| {
        debug!("epub: package document not found");
        IngestError::ProtectedContent
    })?;
    let opf = archive
        .read_path(opf_path.as_bytes())
        .ok_or(IngestError::ProtectedContent)?;

    let paths = spine_paths(&opf, &opf_path);
    debug!("epub: spine opf={} items={}", opf_path, paths.len());

    if let Some(entry) = archive.find(ENCRYPTION_PATH) {
        let locked = match archive.read(entry) {
            Some(encryption) => text_is_encrypted(&encryption, &paths),
            None => true,
        };
        if locked {
            return Err(IngestError::ProtectedContent);
        }
        debug!("epub: only fonts are obfuscated");
    }

    let documents: Vec<Vec<u8>> = paths
        .iter()
        .filter_map(|path| match archive.read_path(path.as_bytes()) {
            Some(document) => Some(document.into_owned()),
            None => {
                debug!("epub: spine item unreadable path={path}");
                None
            }
        })
        .collect();

    if documents.is_empty() {
        return Err(IngestError::ProtectedContent);
    }
    Ok(documents)
}
