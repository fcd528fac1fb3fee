#![allow(dead_code)]

use jtrans_actions::classfile::{encode_modified_utf8, ConstantPool, MAGIC};
use jtrans_actions::{Composite, Rules};
use jtrans_rules::{SelectionRule, SignatureRule};
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Class file for `this_class` whose pool also holds a string literal and a
/// method descriptor mentioning `field_type`
pub fn class_file(this_class: &str, literal: &str, field_type: &str) -> Vec<u8> {
    let descriptor = format!("(L{field_type};)V");
    let utf8 = |out: &mut Vec<u8>, text: &str| {
        let encoded = encode_modified_utf8(text);
        out.push(1);
        out.extend_from_slice(&u16::try_from(encoded.len()).unwrap().to_be_bytes());
        out.extend_from_slice(&encoded);
    };

    let mut out = MAGIC.to_vec();
    out.extend_from_slice(&[0, 0, 0, 61]);
    out.extend_from_slice(&8u16.to_be_bytes());
    utf8(&mut out, this_class); // 1
    out.extend_from_slice(&[7, 0, 1]); // 2: Class #1
    utf8(&mut out, "java/lang/Object"); // 3
    out.extend_from_slice(&[7, 0, 3]); // 4: Class #3
    utf8(&mut out, literal); // 5
    out.extend_from_slice(&[8, 0, 5]); // 6: String #5
    utf8(&mut out, &descriptor); // 7
    out.extend_from_slice(&[0x00, 0x21, 0x00, 0x02, 0x00, 0x04, 0, 0, 0, 0, 0, 0, 0, 0]);
    out
}

/// Decoded `Utf8` constants of a class file, in pool order
pub fn utf8_constants(bytes: &[u8]) -> Vec<String> {
    let pool = ConstantPool::parse(bytes).unwrap();
    let mut constants = Vec::new();
    pool.rewrite(|_, text| {
        constants.push(text.to_string());
        None
    })
    .unwrap();
    constants
}

pub fn zip(entries: &[(&str, &[u8], CompressionMethod)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content, method) in entries {
        let options = SimpleFileOptions::default().compression_method(*method);
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

pub struct Entry {
    pub name: String,
    pub content: Vec<u8>,
    pub method: CompressionMethod,
    pub compressed_size: u64,
}

pub fn unzip(bytes: &[u8]) -> Vec<Entry> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|index| {
            let mut file = archive.by_index(index).unwrap();
            let mut content = Vec::new();
            file.read_to_end(&mut content).unwrap();
            Entry {
                name: file.name().to_string(),
                content,
                method: file.compression(),
                compressed_size: file.compressed_size(),
            }
        })
        .collect()
}

pub fn entry<'a>(entries: &'a [Entry], name: &str) -> &'a Entry {
    entries
        .iter()
        .find(|e| e.name == name)
        .unwrap_or_else(|| panic!("no entry {name}"))
}

pub fn rename_rule() -> SignatureRule {
    SignatureRule::builder()
        .renames([("a.b", "x.y")])
        .build()
        .unwrap()
}

pub fn composite(signature: SignatureRule) -> Composite {
    Composite::new(Rules::new(SelectionRule::select_all(), signature))
}
