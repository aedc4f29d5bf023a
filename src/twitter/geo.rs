//! Geolocation lookup for statuses posted with `--location`.
//!
//! The caller's public IP is read from an echo service, then mapped to
//! coordinates by an XML geolocation service. Both are plain unsigned GETs.

use log::{debug, info};
use regex::Regex;
use reqwest::Client;

use crate::error::{CliError, Result};

/// Latitude/longitude as returned by the geolocation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinates {
    pub lat: String,
    pub long: String,
}

/// Extracts the first dotted-quad IPv4 address from the echo page.
pub(crate) fn extract_ip(html: &str) -> Option<String> {
    let re = Regex::new(r"\b(\d{1,3}(?:\.\d{1,3}){3})\b").ok()?;
    re.captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extracts latitude and longitude from a geoplugin XML document.
pub(crate) fn extract_coordinates(xml: &str) -> Option<Coordinates> {
    let tag = |name: &str| -> Option<String> {
        let re = Regex::new(&format!(r"<{0}>\s*([^<]*?)\s*</{0}>", name)).ok()?;
        re.captures(xml)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().to_string())
            .filter(|v| !v.is_empty())
    };
    Some(Coordinates {
        lat: tag("geoplugin_latitude")?,
        long: tag("geoplugin_longitude")?,
    })
}

async fn fetch(http: &Client, url: &str) -> Result<String> {
    let response = http.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::Location(format!("{} returned {}", url, status)));
    }
    Ok(response.text().await?)
}

/// Resolves the caller's coordinates: public IP first, then IP → lat/long.
pub async fn locate(http: &Client, ip_lookup_url: &str, geo_lookup_url: &str) -> Result<Coordinates> {
    info!("Looking up public IP address");
    let page = fetch(http, ip_lookup_url).await?;
    let ip = extract_ip(&page)
        .ok_or_else(|| CliError::Location("no IP address in lookup response".to_string()))?;
    debug!("Public IP address: {}", ip);

    let url = format!("{}?ip={}", geo_lookup_url, urlencoding::encode(&ip));
    let xml = fetch(http, &url).await?;
    let coordinates = extract_coordinates(&xml).ok_or_else(|| {
        CliError::Location(format!("no coordinates for IP address {}", ip))
    })?;
    info!(
        "Resolved location lat={} long={}",
        coordinates.lat, coordinates.long
    );
    Ok(coordinates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_ip() {
        let html = "<html><head><title>Current IP Check</title></head><body>Current IP Address: 50.131.22.169</body></html>";
        assert_eq!(extract_ip(html), Some("50.131.22.169".to_string()));
        assert_eq!(extract_ip("<body>unknown</body>"), None);
    }

    #[test]
    fn test_extract_coordinates() {
        let xml = "<geoPlugin>\n  <geoplugin_city>San Francisco</geoplugin_city>\n  <geoplugin_latitude>37.76969909668</geoplugin_latitude>\n  <geoplugin_longitude>-122.39330291748</geoplugin_longitude>\n</geoPlugin>";
        assert_eq!(
            extract_coordinates(xml),
            Some(Coordinates {
                lat: "37.76969909668".to_string(),
                long: "-122.39330291748".to_string(),
            })
        );
        assert_eq!(
            extract_coordinates("<geoPlugin><geoplugin_latitude></geoplugin_latitude></geoPlugin>"),
            None
        );
    }
}
