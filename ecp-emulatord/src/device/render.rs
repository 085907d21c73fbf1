//! XML documents served by the control API.
//!
//! All rendering is a pure function of the device identity and catalog.
//! Every user-supplied string goes through [`escape`] before it lands in a
//! document.

use quick_xml::escape::escape;
use super::{AppCatalog, DeviceIdentity};

/// 1x1 transparent PNG returned for every app icon query
pub const APP_PLACEHOLDER_ICON: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0a, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

pub const ACTIVE_APP_DOCUMENT: &str = "<active-app>\n    <app>Roku</app>\n</active-app>";

/// UPnP root description served at the location URL
pub fn root_description(identity: &DeviceIdentity) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" ?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
    <specVersion>
        <major>1</major>
        <minor>0</minor>
    </specVersion>
    <device>
    <deviceType>urn:roku-com:device:player:1-0</deviceType>
    <friendlyName>{name}</friendlyName>
    <manufacturer>Roku</manufacturer>
    <manufacturerURL>http://www.roku.com/</manufacturerURL>
    <modelDescription>Roku Streaming Player Network Media</modelDescription>
    <modelName>Roku 4</modelName>
    <modelNumber>4400X</modelNumber>
    <modelURL>http://www.roku.com/</modelURL>
    <serialNumber>{serial}</serialNumber>
    <UDN>uuid:{udn}</UDN>
    <serviceList>
        <service>
            <serviceType>urn:roku-com:service:ecp:1</serviceType>
            <serviceId>urn:roku-com:serviceId:ecp1-0</serviceId>
            <controlURL/>
            <eventSubURL/>
            <SCPDURL>ecp_SCPD.xml</SCPDURL>
        </service>
    </serviceList>
    </device>
</root>"#,
        name = escape(&identity.friendly_name),
        serial = escape(&identity.serial_number),
        udn = identity.udn,
    )
}

pub fn device_info(identity: &DeviceIdentity) -> String {
    let usn = escape(&identity.usn);
    format!(
        r#"<device-info>
    <udn>{udn}</udn>
    <serial-number>{serial}</serial-number>
    <device-id>{usn}</device-id>
    <vendor-name>Roku</vendor-name>
    <model-number>4400X</model-number>
    <model-name>Roku 4</model-name>
    <model-region>US</model-region>
    <supports-ethernet>true</supports-ethernet>
    <network-type>ethernet</network-type>
    <user-device-name>{name}</user-device-name>
    <software-version>7.5.0</software-version>
    <software-build>09021</software-build>
    <secure-device>true</secure-device>
    <language>en</language>
    <country>US</country>
    <locale>en_US</locale>
    <power-mode>PowerOn</power-mode>
    <supports-suspend>false</supports-suspend>
    <supports-find-remote>false</supports-find-remote>
    <supports-audio-guide>false</supports-audio-guide>
    <developer-enabled>false</developer-enabled>
    <search-enabled>true</search-enabled>
    <voice-search-enabled>false</voice-search-enabled>
    <notifications-enabled>false</notifications-enabled>
    <supports-private-listening>false</supports-private-listening>
    <headphones-connected>false</headphones-connected>
</device-info>"#,
        udn = identity.udn,
        serial = escape(&identity.serial_number),
        usn = usn,
        name = escape(&identity.friendly_name),
    )
}

pub fn app_list(catalog: &AppCatalog) -> String {
    let mut doc = String::from("<apps>\n");
    for app in catalog.entries() {
        doc.push_str(&format!(
            "    <app id=\"{}\" version=\"{}\">{}</app>\n",
            escape(&app.id),
            escape(&app.version),
            escape(&app.name),
        ));
    }
    doc.push_str("</apps>");
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    const DEFAULT_APPS: &str = "<apps>
    <app id=\"1\" version=\"1.0.0\">Emulated App 1</app>
    <app id=\"2\" version=\"1.0.0\">Emulated App 2</app>
    <app id=\"3\" version=\"1.0.0\">Emulated App 3</app>
    <app id=\"4\" version=\"1.0.0\">Emulated App 4</app>
    <app id=\"5\" version=\"1.0.0\">Emulated App 5</app>
    <app id=\"6\" version=\"1.0.0\">Emulated App 6</app>
    <app id=\"7\" version=\"1.0.0\">Emulated App 7</app>
    <app id=\"8\" version=\"1.0.0\">Emulated App 8</app>
    <app id=\"9\" version=\"1.0.0\">Emulated App 9</app>
    <app id=\"10\" version=\"1.0.0\">Emulated App 10</app>
</apps>";

    fn test_identity(name: &str) -> DeviceIdentity {
        DeviceIdentity::new(
            name,
            Some("test-usn".to_string()),
            IpAddr::V4(Ipv4Addr::new(192, 168, 1, 10)),
            8060,
        )
    }

    #[test]
    fn test_default_app_list_matches_template() {
        assert_eq!(app_list(&AppCatalog::default_catalog()), DEFAULT_APPS);
    }

    #[test]
    fn test_app_list_keeps_order_and_attributes() {
        let catalog = AppCatalog::parse(Some("1:Netflix,2:YouTube"));
        let doc = app_list(&catalog);

        let netflix = doc.find("<app id=\"1\" version=\"1.0.0\">Netflix</app>").unwrap();
        let youtube = doc.find("<app id=\"2\" version=\"1.0.0\">YouTube</app>").unwrap();
        assert!(netflix < youtube);
        assert_eq!(doc.matches("<app ").count(), 2);
    }

    #[test]
    fn test_app_list_escapes_markup() {
        let catalog = AppCatalog::parse(Some("a&b:Tom & Jerry <Kids>,2:\"Quoted\""));
        let doc = app_list(&catalog);

        assert!(doc.contains("<app id=\"a&amp;b\" version=\"1.0.0\">Tom &amp; Jerry &lt;Kids&gt;</app>"));
        assert!(doc.contains("&quot;Quoted&quot;"));
        assert!(!doc.contains("<Kids>"));
    }

    #[test]
    fn test_device_info_contents() {
        let doc = device_info(&test_identity("Living Room"));

        assert!(doc.contains("<serial-number>test-usn</serial-number>"));
        assert!(doc.contains("<device-id>test-usn</device-id>"));
        assert!(doc.contains("<user-device-name>Living Room</user-device-name>"));
        assert!(doc.contains("<model-name>Roku 4</model-name>"));
        assert!(doc.contains("<supports-ethernet>true</supports-ethernet>"));
    }

    #[test]
    fn test_device_info_escapes_name() {
        let doc = device_info(&test_identity("Kid's <Room>"));
        assert!(doc.contains("<user-device-name>Kid&apos;s &lt;Room&gt;</user-device-name>"));
    }

    #[test]
    fn test_root_description_contents() {
        let identity = test_identity("Den");
        let doc = root_description(&identity);

        assert!(doc.contains("urn:roku-com:device:player:1-0"));
        assert!(doc.contains("<friendlyName>Den</friendlyName>"));
        assert!(doc.contains("<serialNumber>test-usn</serialNumber>"));
        assert!(doc.contains(&format!("<UDN>uuid:{}</UDN>", identity.udn)));
    }

    #[test]
    fn test_placeholder_icon_is_png() {
        assert_eq!(&APP_PLACEHOLDER_ICON[..8], b"\x89PNG\r\n\x1a\n");
    }
}
