// src/services/digest.rs

//! HTML digest rendering.
//!
//! Produces a table-based layout that renders in common desktop mail
//! clients: a header logo referenced by content id, one bordered block per
//! listing, and a footer.

use crate::error::Result;
use crate::models::{DigestLocale, Listing};
use crate::utils::apply_link;
use html_escape::{encode_double_quoted_attribute, encode_text};

/// Content id of the inline logo part.
pub const LOGO_CID: &str = "logo_cid";

/// Inputs of the digest template.
pub struct DigestTemplate<'a> {
    pub locale: &'a DigestLocale,
    /// Base URL of the "Apply" button
    pub apply_url: &'a str,
    /// Credential appended to apply links, if one was obtained
    pub token: Option<&'a str>,
    /// Whether a logo part accompanies the HTML
    pub with_logo: bool,
}

impl DigestTemplate<'_> {
    /// Render the full HTML document for the given listings.
    pub fn render(&self, listings: &[Listing]) -> Result<String> {
        let l = self.locale;
        let mut html = String::new();

        html.push_str(&format!(
            r##"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{heading}</title>
</head>
<body style="margin:0; padding:0; background-color:#f4f4f4;">
  <table border="0" cellpadding="0" cellspacing="0" width="100%">
    <tr>
      <td align="center" style="padding: 10px 0;">
        <table border="0" cellpadding="0" cellspacing="0" width="600" style="border: 1px solid #cccccc; background-color:#ffffff;">
"##,
            heading = encode_text(&l.heading)
        ));

        if self.with_logo {
            html.push_str(&format!(
                r##"          <tr>
            <td align="center" bgcolor="#ffffff" style="padding: 20px 0;">
              <img src="cid:{LOGO_CID}" width="200" alt="Logo" style="display: block; margin: auto;">
            </td>
          </tr>
"##
            ));
        }

        html.push_str(&format!(
            r##"          <tr>
            <td style="padding: 40px 30px; font-family: Arial, sans-serif; font-size: 16px; line-height: 20px; color: #333333;">
              <p>{greeting}</p>
              <p>{intro}</p>
"##,
            greeting = encode_text(&l.greeting),
            intro = encode_text(&l.intro)
        ));

        for listing in listings {
            html.push_str(&self.render_listing(listing)?);
        }

        html.push_str(&format!(
            r##"              <p>{sign_off}</p>
              <p><strong>{team}</strong></p>
            </td>
          </tr>
          <tr>
            <td bgcolor="#336699" style="padding: 30px; font-family: Arial, sans-serif; font-size: 14px; color: #ffffff;">
              <p style="margin: 0;">{footer}</p>
            </td>
          </tr>
        </table>
      </td>
    </tr>
  </table>
</body>
</html>
"##,
            sign_off = encode_text(&l.sign_off),
            team = encode_text(&l.team),
            footer = encode_text(&l.footer)
        ));

        Ok(html)
    }

    fn render_listing(&self, listing: &Listing) -> Result<String> {
        let l = self.locale;
        let link = apply_link(self.apply_url, &listing.id.to_string(), self.token)?;

        let rows = [
            (&l.label_title, &listing.title),
            (&l.label_description, &listing.description),
            (&l.label_benefits, &listing.benefits),
            (&l.label_requirements, &listing.requirements),
            (&l.label_salary, &listing.salary_text),
            (&l.label_quantity, &listing.quantity_text),
            (&l.label_expiration, &listing.expiration_date_text),
            (&l.label_region, &listing.region_text),
        ];

        let mut block = String::from(
            r##"              <table border="0" cellpadding="20" cellspacing="0" width="100%" style="margin-bottom:20px; border:1px solid #e0e0e0; border-radius: 10px; background: #f8fafc;">
"##,
        );
        for (label, value) in rows {
            block.push_str(&format!(
                r##"                <tr>
                  <td style="font-weight:bold; width:150px;">{}</td>
                  <td>{}</td>
                </tr>
"##,
                encode_text(label),
                encode_text(value)
            ));
        }
        block.push_str(&format!(
            r##"                <tr>
                  <td colspan="2" align="left" style="padding-top: 10px;">
                    <a href="{}" target="_blank" style="background-color:#007BFF; color:#ffffff; text-decoration:none; padding:8px 16px; border-radius:4px; font-size:14px; display:inline-block;">{}</a>
                  </td>
                </tr>
              </table>
"##,
            encode_double_quoted_attribute(&link),
            encode_text(&l.apply)
        ));

        Ok(block)
    }
}
