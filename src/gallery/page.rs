//! # Página de la Galería
//! src/gallery/page.rs
//!
//! Genera el HTML de `GET /` y `GET /gallery`: formulario de upload y
//! una tarjeta por imagen con su botón de borrar.

use crate::http::encoding::{html_escape, percent_encode};
use std::fmt::Write;

const HEAD: &str = "<!DOCTYPE html><html lang='en'><head><meta charset='UTF-8'>\
<meta name='viewport' content='width=device-width, initial-scale=1.0'>\
<title>Gallery</title><style>\
body{background:#111827;color:#fff;font-family:sans-serif;margin:0;padding:1rem;display:flex;flex-direction:column;align-items:center}\
h1{font-size:1.875rem;margin-bottom:1.5rem}\
.upload{display:flex;flex-direction:column;gap:1rem;align-items:center;width:100%;max-width:48rem;margin-bottom:2rem}\
.upload input[type='file']{width:100%}\
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(16rem,1fr));gap:2rem;width:100%;max-width:64rem}\
.card{background:#1f2937;border-radius:.5rem;padding:1rem;display:flex;flex-direction:column;align-items:center}\
.card img{max-width:100%;max-height:12rem;object-fit:contain;margin-bottom:1rem;border:1px solid #374151;border-radius:.25rem}\
.card span{font-size:.875rem;margin-bottom:.5rem;word-break:break-all}\
.btn{color:#fff;font-weight:bold;border:0;border-radius:.25rem;padding:.5rem 1rem;cursor:pointer}\
.btn-upload{background:#2563eb}.btn-delete{background:#dc2626}\
.empty{color:#9ca3af}\
@media (max-width:640px){.upload input{width:100% !important}}\
</style></head><body>";

const SCRIPT: &str = "<script>\
document.querySelector('form.upload').addEventListener('submit',function(e){\
var input=this.querySelector('input[type=\"file\"]');\
if(input.files.length===0){alert('Please select a file');e.preventDefault();return;}\
var btn=this.querySelector('input[type=\"submit\"]');\
btn.value='Uploading...';btn.disabled=true;});\
</script>";

/// Renderiza la página con las imágenes dadas, en el orden recibido
pub fn render_gallery(images: &[String]) -> String {
    let mut html = String::with_capacity(2048 + images.len() * 256);
    html.push_str(HEAD);
    html.push_str("<h1>Gallery</h1>");
    html.push_str(
        "<form class='upload' method='post' enctype='multipart/form-data' action='/upload'>\
         <input type='file' name='file' accept='image/*' capture='environment' required />\
         <input type='submit' value='Upload' class='btn btn-upload' /></form>",
    );

    if images.is_empty() {
        html.push_str("<p class='empty'>No images yet.</p>");
    }

    html.push_str("<div class='grid'>");
    for name in images {
        let encoded = percent_encode(name);
        let label = html_escape(name);
        // write! sobre String no falla
        let _ = write!(
            html,
            "<div class='card'>\
             <img src='/images/{0}' alt='{1}' loading='lazy'/>\
             <span>{1}</span>\
             <form method='post' action='/delete?name={0}'>\
             <input type='submit' value='Delete' class='btn btn-delete'/></form></div>",
            encoded, label
        );
    }
    html.push_str("</div>");
    html.push_str(SCRIPT);
    html.push_str("</body></html>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_empty_gallery() {
        let html = render_gallery(&[]);

        assert!(html.contains("<h1>Gallery</h1>"));
        assert!(html.contains("action='/upload'"));
        assert!(html.contains("enctype='multipart/form-data'"));
        assert!(html.contains("No images yet."));
    }

    #[test]
    fn test_render_lists_images_with_delete_forms() {
        let html = render_gallery(&["a.png".to_string(), "b.jpg".to_string()]);

        assert!(html.contains("src='/images/a.png'"));
        assert!(html.contains("action='/delete?name=a.png'"));
        assert!(html.contains("src='/images/b.jpg'"));
        assert!(html.contains("action='/delete?name=b.jpg'"));
        assert!(!html.contains("No images yet."));
    }

    #[test]
    fn test_render_encodes_and_escapes_names() {
        let html = render_gallery(&["my <cat>'s.png".to_string()]);

        assert!(html.contains("src='/images/my%20%3Ccat%3E%27s.png'"));
        assert!(html.contains("my &lt;cat&gt;&#39;s.png"));
        assert!(!html.contains("<cat>"));
    }
}
