//! HTML map output
//!
//! Builds the map page and the nearby-lodging fragment from a `MapReport`.
//! Values only reach the markup through `format::escape`.

use crate::client::ClientIdentity;
use crate::config::Config;
use crate::constants::assets;
use crate::coord::Coordinates;
use crate::error::{ProviderError, Result};
use crate::format::escape::{html, js_html_string, js_number, js_string};
use crate::format::{MapRenderer, MapReport, OutputFormatter};
use crate::places::Selection;

const STYLE: &str = r#"
        body { font-family: Arial, sans-serif; padding: 20px; }
        #map, #nearby-map {
            height: 500px;
            width: 100%;
            border: 2px solid #0078d4;
            border-radius: 10px;
        }
        .info { margin: 10px 0; }
        .error { color: red; }"#;

/// HTML formatter - outputs the full map page
pub struct HtmlFormatter;

impl OutputFormatter for HtmlFormatter {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "Interactive map page"
    }

    fn format(&self, report: &MapReport, config: &Config) -> Result<String> {
        Ok(render_page(report, config))
    }
}

/// Fail early when the configured renderer cannot run at all
pub fn check_configured(config: &Config) -> std::result::Result<(), ProviderError> {
    if config.map.renderer == MapRenderer::Google && config.api_keys.google_maps.is_empty() {
        return Err(ProviderError::MissingKey("google_maps"));
    }
    Ok(())
}

/// One pin on the map
struct Marker {
    coords: Coordinates,
    label: String,
    open: bool,
}

/// Where the map goes and what it shows
struct MapView<'a> {
    container: &'a str,
    callback: &'a str,
    center: Coordinates,
    zoom: u8,
    markers: Vec<Marker>,
    circle: Option<(Coordinates, u32)>,
}

fn heading(selection: Selection, keyword: &str) -> String {
    match selection {
        Selection::First => format!("Closest {}", keyword),
        Selection::Second => format!("Second closest {}", keyword),
        Selection::All => format!("Nearby {}", keyword),
    }
}

fn places_status(report: &MapReport, keyword: &str) -> String {
    report
        .places
        .as_ref()
        .map(|p| p.status.clone())
        .unwrap_or_else(|| format!("No {} found nearby", keyword))
}

fn markers(report: &MapReport) -> Vec<Marker> {
    let candidates = report
        .places
        .as_ref()
        .map(|p| p.candidates.as_slice())
        .unwrap_or_default();
    let single = candidates.len() == 1;

    let mut markers = vec![Marker {
        coords: report.location.position.coords,
        label: report.location.status.clone(),
        open: !single,
    }];

    markers.extend(candidates.iter().map(|c| Marker {
        coords: c.coords,
        label: match c.distance_km {
            Some(d) => format!("{} ({:.2} km)", c.name, d),
            None => c.name.clone(),
        },
        open: single,
    }));

    markers
}

/// Stylesheets needed in the document head
fn head_assets(renderer: MapRenderer) -> String {
    match renderer {
        MapRenderer::Leaflet => format!(
            r#"<link rel="stylesheet" href="{}"/>"#,
            html(assets::LEAFLET_CSS)
        ),
        MapRenderer::Google => String::new(),
    }
}

fn leaflet_script(view: &MapView) -> String {
    let mut js = String::new();
    js.push_str(&format!(
        "            var map = L.map({}).setView([{}, {}], {});\n",
        js_string(view.container),
        js_number(view.center.lat),
        js_number(view.center.lng),
        view.zoom
    ));
    js.push_str(&format!(
        "            L.tileLayer({}, {{ maxZoom: 19, attribution: {} }}).addTo(map);\n",
        js_string(assets::OSM_TILES),
        js_string("&copy; OpenStreetMap")
    ));
    for marker in &view.markers {
        js.push_str(&format!(
            "            L.marker([{}, {}]).addTo(map).bindPopup({}){};\n",
            js_number(marker.coords.lat),
            js_number(marker.coords.lng),
            js_html_string(&marker.label),
            if marker.open { ".openPopup()" } else { "" }
        ));
    }
    if let Some((center, radius)) = view.circle {
        js.push_str(&format!(
            "            L.circle([{}, {}], {{ radius: {}, fillOpacity: 0.1 }}).addTo(map);\n",
            js_number(center.lat),
            js_number(center.lng),
            radius
        ));
    }

    format!(
        r#"<script src="{src}"></script>
    <script>
        try {{
{js}        }} catch (e) {{
            console.error("Map failed to load:", e);
            document.getElementById({container}).innerHTML =
                '<p class="error">Could not load the map.</p>';
        }}
    </script>"#,
        src = html(assets::LEAFLET_JS),
        js = js,
        container = js_string(view.container)
    )
}

fn google_script(view: &MapView, api_key: &str) -> String {
    let mut js = String::new();
    js.push_str(&format!(
        "            var map = new google.maps.Map(document.getElementById({}), \
         {{ center: {{ lat: {}, lng: {} }}, zoom: {} }});\n",
        js_string(view.container),
        js_number(view.center.lat),
        js_number(view.center.lng),
        view.zoom
    ));
    for marker in &view.markers {
        js.push_str(&format!(
            "            new google.maps.Marker(\
             {{ position: {{ lat: {}, lng: {} }}, map: map, title: {} }});\n",
            js_number(marker.coords.lat),
            js_number(marker.coords.lng),
            js_string(&marker.label)
        ));
    }
    if let Some((center, radius)) = view.circle {
        js.push_str(&format!(
            "            new google.maps.Circle({{ map: map, \
             center: {{ lat: {}, lng: {} }}, radius: {}, fillOpacity: 0.1 }});\n",
            js_number(center.lat),
            js_number(center.lng),
            radius
        ));
    }

    let src = format!(
        "{}?key={}&callback={}",
        assets::GOOGLE_MAPS_JS,
        urlencoding::encode(api_key),
        urlencoding::encode(view.callback)
    );

    format!(
        r#"<script>
        function {callback}() {{
{js}        }}
    </script>
    <script async src="{src}"></script>"#,
        callback = view.callback,
        js = js,
        src = html(&src)
    )
}

fn map_scripts(view: &MapView, config: &Config) -> String {
    match config.map.renderer {
        MapRenderer::Leaflet => leaflet_script(view),
        MapRenderer::Google => google_script(view, &config.api_keys.google_maps),
    }
}

/// Render the full map page
pub fn render_page(report: &MapReport, config: &Config) -> String {
    let keyword = &config.places.keyword;
    let title = heading(report.selection, keyword);
    let location_class = if report.location.error.is_some() {
        "info error"
    } else {
        "info"
    };

    let link = config
        .format_url(None, report.center.lat, report.center.lng)
        .map(|url| {
            format!(
                "\n    <p class=\"info\">\
                 <a href=\"{}\" target=\"_blank\" rel=\"noopener\">Open in {}</a></p>",
                html(&url),
                html(&config.url.default)
            )
        })
        .unwrap_or_default();

    let view = MapView {
        container: "map",
        callback: "initMap",
        center: report.center,
        zoom: report.zoom,
        markers: markers(report),
        circle: report
            .radius_m
            .map(|r| (report.location.position.coords, r)),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    {assets}
    <style>{style}
    </style>
</head>
<body>
    <h1>{title}</h1>
    <p class="info">Detected IP: {ip}</p>
    <p class="{location_class}">{location}</p>
    <p class="info">{places}</p>
    <p class="info">Displayed coordinates: Lat {lat}, Long {lng}</p>{link}
    <div id="map"></div>

    {scripts}
</body>
</html>
"#,
        title = html(&title),
        assets = head_assets(config.map.renderer),
        style = STYLE,
        ip = html(&report.identity.ip_address),
        location_class = location_class,
        location = html(&report.location.status),
        places = html(&places_status(report, keyword)),
        lat = report.center.lat,
        lng = report.center.lng,
        link = link,
        scripts = map_scripts(&view, config),
    )
}

/// Render the nearby-lodging fragment: a list plus a map with a radius overlay
pub fn render_nearby_fragment(report: &MapReport, config: &Config) -> String {
    let keyword = &config.places.keyword;
    let candidates = report
        .places
        .as_ref()
        .map(|p| p.candidates.as_slice())
        .unwrap_or_default();

    let list = if candidates.is_empty() {
        String::new()
    } else {
        let items: Vec<String> = candidates
            .iter()
            .map(|c| match c.distance_km {
                Some(d) => format!("        <li>{} ({:.2} km)</li>", html(&c.name), d),
                None => format!("        <li>{}</li>", html(&c.name)),
            })
            .collect();
        format!("\n    <ul class=\"places\">\n{}\n    </ul>", items.join("\n"))
    };

    let radius_line = report
        .radius_m
        .map(|r| format!(" within {:.1} km", f64::from(r) / 1000.0))
        .unwrap_or_default();

    let view = MapView {
        container: "nearby-map",
        callback: "initNearbyMap",
        center: report.center,
        zoom: report.zoom,
        markers: markers(report),
        circle: report.radius_m.map(|r| (report.center, r)),
    };

    format!(
        r#"<section class="nearby">
    {assets}
    <style>{style}
    </style>
    <h2>{title}</h2>
    <p class="info">Searching{radius} of Lat {lat}, Long {lng}</p>
    <p class="info">{status}</p>{list}
    <div id="nearby-map"></div>
    {scripts}
</section>
"#,
        assets = head_assets(config.map.renderer),
        style = STYLE,
        title = html(&heading(Selection::All, keyword)),
        radius = radius_line,
        lat = report.center.lat,
        lng = report.center.lng,
        status = html(&places_status(report, keyword)),
        list = list,
        scripts = map_scripts(&view, config),
    )
}

/// Page shown when a private client address is rejected
pub fn render_rejection(identity: &ClientIdentity) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Location unavailable</title>
    <style>{style}
    </style>
</head>
<body>
    <h1>Location unavailable</h1>
    <p class="info">Detected IP: {ip}</p>
    <p class="info error">This address is private or local and cannot be located.</p>
</body>
</html>
"#,
        style = STYLE,
        ip = html(&identity.ip_address),
    )
}
