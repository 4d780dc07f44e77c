// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test data generators for abuse simulation.

use nitron_intake::ContactForm;

/// Generate a pool of distinct client keys.
pub fn generate_client_keys(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("session-{i:04}")).collect()
}

/// Generate forms that pass every field check.
pub fn generate_valid_forms(count: usize) -> Vec<ContactForm> {
    (0..count)
        .map(|i| {
            let phone = if i % 2 == 0 {
                String::new()
            } else {
                format!("(19) 9{:04}-{:04}", 8000 + i % 1000, i % 10_000)
            };
            ContactForm::new(
                format!("Cliente {i}"),
                format!("cliente{i}@empresa.com.br"),
                phone,
                format!("Gostaria de um orçamento para o projeto número {i}."),
            )
        })
        .collect()
}

/// Forms that must be rejected, paired with how many fields are wrong.
pub fn generate_invalid_forms() -> Vec<(ContactForm, usize)> {
    vec![
        (ContactForm::default(), 3),
        (ContactForm::new("J", "jo@x.com", "", "0123456789"), 1),
        (ContactForm::new("Jo", "jo@x", "", "0123456789"), 1),
        (ContactForm::new("Jo", "jo@x.com", "1199999", "0123456789"), 1),
        (ContactForm::new("Jo", "jo@x.com", "", "012345678"), 1),
        (ContactForm::new("Jo", "jo@x.com", "", "m".repeat(2001)), 1),
        (ContactForm::new("a".repeat(101), "jo x@y.com", "abc", "  "), 4),
        (ContactForm::new("   ", "   ", "   ", "   "), 3),
    ]
}

/// Script-injection payloads seen against contact forms.
pub fn generate_xss_payloads() -> Vec<&'static str> {
    vec![
        "<script>alert(1)</script>",
        "<img src=x onerror=alert(1)>",
        "javascript:alert(document.cookie)",
        "JaVaScRiPt:alert(1)",
        "<a href=\"javascript:void(0)\" onmouseover=steal()>clique</a>",
        "javajavascript:script:alert(1)",
        "oonclick=nclick=alert(1)",
        "<<script>>alert(1)<</script>>",
        "<body onload=init()>",
        "\"><svg onload=alert(1)>",
    ]
}

/// URLs the guard must refuse.
pub fn generate_malicious_urls() -> Vec<&'static str> {
    vec![
        "",
        "   ",
        "#",
        "javascript:alert(1)",
        "JAVASCRIPT:alert(1)",
        "data:text/html,<script>alert(1)</script>",
        "vbscript:msgbox(1)",
        "ftp://example.com/file",
        "file:///etc/passwd",
        "https://example.com/?next=javascript:alert(1)",
        "https://example.com/img?onerror=alert(1)",
        "https://example.com/?x=<script>",
        "https://example.com/?onload=go",
        "http://[::1",
    ]
}

/// URLs the guard must accept.
pub fn generate_safe_urls() -> Vec<&'static str> {
    vec![
        "https://example.com/demo",
        "http://example.com",
        "https://nitronflow.com.br/portfolio/automacao",
        "/portfolio/demo",
        "demo/index.html",
        "https://example.com/search?q=online+data",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_client_keys() {
        let keys = generate_client_keys(256);
        assert_eq!(keys.len(), 256);
        let unique: std::collections::HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), 256);
    }

    #[test]
    fn test_generate_valid_forms() {
        let forms = generate_valid_forms(10);
        assert_eq!(forms.len(), 10);
        assert!(forms[0].phone.is_empty());
        assert!(!forms[1].phone.is_empty());
    }
}
