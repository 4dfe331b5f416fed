// src/uploads/fixtures.rs
//! Small, valid sample files for tests

use std::io::{BufWriter, Cursor, Write};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use zip::write::SimpleFileOptions;

fn encode_image(format: ImageFormat) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([200, 40, 90])));
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

pub fn png_bytes() -> Vec<u8> {
    encode_image(ImageFormat::Png)
}

pub fn jpeg_bytes() -> Vec<u8> {
    encode_image(ImageFormat::Jpeg)
}

pub fn pdf_bytes() -> Vec<u8> {
    use printpdf::{Mm, PdfDocument};

    let (doc, _page, _layer) =
        PdfDocument::new("Curriculum Vitae", Mm(210.0), Mm(297.0), "Layer 1");
    let mut writer = BufWriter::new(Vec::new());
    doc.save(&mut writer).unwrap();
    writer.into_inner().unwrap()
}

fn zip_with(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, body) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn docx_bytes() -> Vec<u8> {
    zip_with(&[
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#,
        ),
        (
            "word/document.xml",
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Experience</w:t></w:r></w:p></w:body></w:document>"#,
        ),
    ])
}

pub fn plain_zip_bytes() -> Vec<u8> {
    zip_with(&[("notes.txt", "just an archive")])
}

pub fn gif_bytes() -> Vec<u8> {
    b"GIF89a\x01\x00\x01\x00\x00\x00\x00;".to_vec()
}

pub fn garbage_bytes() -> Vec<u8> {
    b"definitely not a supported document".to_vec()
}
