//! KML 2.2 output for georeferenced annotation polygons.
//!
//! One `<Placemark>` per polygon, coordinates as `lon,lat,0` triples at
//! six decimal places, ring closed by repeating the first vertex. An
//! empty polygon list still yields a valid document.

use std::fmt::Write;

use crate::GeoreferencedPolygon;

/// Render a KML document containing all polygons.
pub fn write_kml(polygons: &[GeoreferencedPolygon], document_name: &str) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<kml xmlns=\"http://www.opengis.net/kml/2.2\">\n");
    out.push_str("  <Document>\n");
    let _ = writeln!(out, "    <name>{}</name>", escape_xml(document_name));

    for (index, poly) in polygons.iter().enumerate() {
        write_placemark(&mut out, poly, index + 1);
    }

    out.push_str("  </Document>\n");
    out.push_str("</kml>\n");
    out
}

fn write_placemark(out: &mut String, poly: &GeoreferencedPolygon, number: usize) {
    let _ = writeln!(out, "    <Placemark>");
    let _ = writeln!(out, "      <name>Annotation {}</name>", number);
    let _ = writeln!(
        out,
        "      <description>id: {}; center: {:.6}, {:.6}</description>",
        escape_xml(&poly.id),
        poly.center.lat,
        poly.center.lon
    );
    let _ = writeln!(out, "      <Polygon>");
    let _ = writeln!(out, "        <outerBoundaryIs>");
    let _ = writeln!(out, "          <LinearRing>");
    let _ = writeln!(out, "            <coordinates>");

    for corner in poly.corners.iter().chain(poly.corners.first()) {
        let _ = writeln!(
            out,
            "              {:.6},{:.6},0",
            corner.lon, corner.lat
        );
    }

    let _ = writeln!(out, "            </coordinates>");
    let _ = writeln!(out, "          </LinearRing>");
    let _ = writeln!(out, "        </outerBoundaryIs>");
    let _ = writeln!(out, "      </Polygon>");
    let _ = writeln!(out, "    </Placemark>");
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
