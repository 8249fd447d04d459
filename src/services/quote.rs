//! Order quote document ("Đơn đặt hàng kem").
//!
//! Builds the content of the printable order form: company header, customer
//! block, the three item sections, shipping, grand totals, payment terms and
//! signatures. Layout and PDF encoding belong to the client; this module only
//! decides what goes on the page.

use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::customer::Customer;
use crate::models::order::Order;

pub const COMPANY_HEADER: [&str; 5] = [
    "CÔNG TY CỔ PHẦN ĐẦU TƯ BABY BOSS",
    "MST: 0316366057",
    "Địa chỉ: Tầng 14, Toà nhà HM Town, 412, Nguyễn Thị Minh Khai, phường Bàn Cờ, Thành phố Hồ Chí Minh.",
    "Hotline: 1900 99 88 80",
    "Website: www.babyboss.com.vn",
];
pub const TITLE: &str = "ĐƠN ĐẶT HÀNG KEM";
pub const COLUMNS: [&str; 8] = [
    "STT",
    "Tên sản phẩm",
    "Dòng SP",
    "Quy cách",
    "Số lượng",
    "ĐVT",
    "Đơn giá (VNĐ)",
    "Thành tiền (VNĐ)",
];
const BOX_UNIT: &str = "Hộp";

pub const PAYMENT_TERMS: [&str; 8] = [
    "1. Thanh toán:",
    "- Thanh toán lần 1 với 50% giá trị đơn hàng ngay sau khi khách hàng xác nhận đơn hàng.",
    "- Thanh toán lần 2 với 50% giá trị đơn hàng còn lại ngay sau khi khách hàng nhận và kiểm tra hàng.",
    "2. Phương thức thanh toán: Chuyển khoản hoặc tiền mặt",
    "- Số tài khoản 112568",
    "- Chủ tài khoản: CONG TY CO PHAN DAU TU BABY BOSS",
    "- Ngân hàng EXIMBANK",
    "Thời gian làm việc và giao hàng: từ thứ hai đến thứ bảy; sáng từ 8 giờ đến 12 giờ, chiều từ 13 giờ đến 17 giờ; Chủ nhật nghỉ.",
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRow {
    pub stt: String,
    pub name: String,
    pub line: String,
    pub size: String,
    pub quantity: String,
    pub unit: String,
    pub price: String,
    pub total: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSection {
    pub title: String,
    pub rows: Vec<QuoteRow>,
    // Last row of the printed table
    pub subtotal: QuoteRow,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub role: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDocument {
    pub file_name: String,
    pub header: Vec<String>,
    pub title: String,
    pub order_date: NaiveDate,
    pub info: Vec<(String, String)>,
    pub columns: Vec<String>,
    pub sections: Vec<QuoteSection>,
    pub shipping_cost: f64,
    pub grand_total_value: f64,
    pub grand_total_payment: f64,
    pub deposit: f64,
    pub payment_terms: Vec<String>,
    pub signatures: Vec<Signature>,
}

/// Who the document is about, beyond what the order itself records.
pub struct QuoteParties<'a> {
    // Present when quoting a draft: adds phone and address lines
    pub customer: Option<&'a Customer>,
    pub sales_name: String,
    pub author_name: String,
}

pub fn build_quote(order: &Order, parties: &QuoteParties<'_>) -> QuoteDocument {
    let ice_cream_total = order.total_ice_cream_revenue;
    let topping_total = order.total_topping_revenue;
    let promo_total = order.discount_value() + order.gift_value();
    let shipping = order.shipping();

    let mut info = vec![
        ("Tên Khách hàng".to_string(), order.company_name.clone()),
        ("Nhân viên phụ trách".to_string(), parties.sales_name.clone()),
    ];
    match parties.customer {
        Some(c) => {
            info.push(("Số điện thoại khách hàng".to_string(), c.phone.clone()));
            info.push(("Địa chỉ khách hàng".to_string(), c.address.clone()));
        }
        None => info.push(("Người liên hệ".to_string(), order.customer_name.clone())),
    }

    let mut sections = Vec::with_capacity(3);

    let ice_cream_rows = order
        .ice_cream_items
        .iter()
        .enumerate()
        .map(|(idx, i)| QuoteRow {
            stt: (idx + 1).to_string(),
            name: format!("Kem {}", i.flavor),
            line: i.line.as_str().to_string(),
            size: i.size.as_str().to_string(),
            quantity: i.quantity.to_string(),
            unit: BOX_UNIT.to_string(),
            price: format_number(i.price_per_unit),
            total: format_number(i.total),
        })
        .collect();
    sections.push(QuoteSection {
        title: "I".to_string(),
        rows: ice_cream_rows,
        subtotal: subtotal_row(
            "Tổng hàng bán (I)",
            Some(order.purchased_ice_cream_quantity()),
            ice_cream_total,
        ),
        amount: ice_cream_total,
    });

    // Section II is left off the page when there are no toppings
    if !order.topping_items.is_empty() {
        let rows = order
            .topping_items
            .iter()
            .enumerate()
            .map(|(idx, t)| QuoteRow {
                stt: (idx + 1).to_string(),
                name: t.name.clone(),
                line: "-".to_string(),
                size: "-".to_string(),
                quantity: t.quantity.to_string(),
                unit: t.unit.clone(),
                price: format_number(t.price_per_unit),
                total: format_number(t.total),
            })
            .collect();
        sections.push(QuoteSection {
            title: "II".to_string(),
            rows,
            subtotal: subtotal_row("Tổng dụng cụ và topping (II)", None, topping_total),
            amount: topping_total,
        });
    }

    let discounts = order.discount_items.iter().map(|i| QuoteRow {
        stt: String::new(),
        name: format!("[CK] Kem {}", i.flavor),
        line: i.line.as_str().to_string(),
        size: i.size.as_str().to_string(),
        quantity: i.quantity.to_string(),
        unit: BOX_UNIT.to_string(),
        price: format_number(0.0),
        total: format_number(0.0),
    });
    let gifts = order.gift_items.iter().map(|g| QuoteRow {
        stt: String::new(),
        name: format!("[Quà] {}", g.name),
        line: "-".to_string(),
        size: "-".to_string(),
        quantity: g.quantity.to_string(),
        unit: g.unit.clone(),
        price: format_number(g.price_per_unit),
        total: format_number(g.total),
    });
    let promo_rows = discounts
        .chain(gifts)
        .enumerate()
        .map(|(idx, mut row)| {
            row.stt = (idx + 1).to_string();
            row
        })
        .collect();
    sections.push(QuoteSection {
        title: "III".to_string(),
        rows: promo_rows,
        subtotal: subtotal_row("Tổng chiết khấu và khuyến mãi (III)", None, promo_total),
        amount: promo_total,
    });

    let grand_total_payment = order.payable_amount();

    QuoteDocument {
        file_name: format!(
            "Order_{}_{}.pdf",
            remove_vietnamese_tones(&order.company_name),
            order.date.format("%Y-%m-%d")
        ),
        header: COMPANY_HEADER.iter().map(|s| s.to_string()).collect(),
        title: TITLE.to_string(),
        order_date: order.date,
        info,
        columns: COLUMNS.iter().map(|s| s.to_string()).collect(),
        sections,
        shipping_cost: shipping,
        grand_total_value: ice_cream_total + topping_total + promo_total + shipping,
        grand_total_payment,
        deposit: order.deposit_amount.unwrap_or(grand_total_payment * 0.5),
        payment_terms: PAYMENT_TERMS.iter().map(|s| s.to_string()).collect(),
        signatures: vec![
            Signature { role: "NGƯỜI ĐẶT HÀNG".to_string(), name: order.customer_name.clone() },
            Signature { role: "NGƯỜI LẬP ĐƠN".to_string(), name: parties.author_name.clone() },
        ],
    }
}

fn subtotal_row(label: &str, quantity: Option<i64>, amount: f64) -> QuoteRow {
    QuoteRow {
        stt: String::new(),
        name: label.to_string(),
        line: String::new(),
        size: String::new(),
        quantity: quantity.map(|q| q.to_string()).unwrap_or_default(),
        unit: String::new(),
        price: String::new(),
        total: format_number(amount),
    }
}

/// Plain-text rendering, one table row per line.
pub fn render_text(doc: &QuoteDocument) -> String {
    let mut out = String::new();
    for line in &doc.header {
        let _ = writeln!(out, "{line}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", doc.title);
    let _ = writeln!(out, "Ngày đặt hàng: {}", doc.order_date.format("%Y-%m-%d"));
    for (label, value) in &doc.info {
        let _ = writeln!(out, "{label}: {value}");
    }
    for section in &doc.sections {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", doc.columns.join(" | "));
        for row in section.rows.iter().chain(std::iter::once(&section.subtotal)) {
            let _ = writeln!(
                out,
                "{} | {} | {} | {} | {} | {} | {} | {}",
                row.stt, row.name, row.line, row.size, row.quantity, row.unit, row.price, row.total
            );
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Chi phí vận chuyển và bảo quản (IV): {}", format_number(doc.shipping_cost));
    let _ = writeln!(out, "Tổng giá trị đơn hàng (I + II + III + IV): {}", format_number(doc.grand_total_value));
    let _ = writeln!(out, "Tổng giá trị thanh toán (I + II + IV): {}", format_number(doc.grand_total_payment));
    let _ = writeln!(out);
    for line in &doc.payment_terms {
        let _ = writeln!(out, "{line}");
    }
    let _ = writeln!(out);
    for sig in &doc.signatures {
        let _ = writeln!(out, "{}: {}", sig.role, sig.name);
    }
    out
}

/// vi-VN grouping: 1234567 -> "1.234.567". Fractions are rounded away.
pub fn format_number(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

pub fn remove_vietnamese_tones(text: &str) -> String {
    text.chars().map(strip_tone).collect()
}

fn strip_tone(c: char) -> char {
    match c {
        'à' | 'á' | 'ạ' | 'ả' | 'ã' | 'â' | 'ầ' | 'ấ' | 'ậ' | 'ẩ' | 'ẫ' | 'ă' | 'ằ' | 'ắ' | 'ặ' | 'ẳ' | 'ẵ' => 'a',
        'À' | 'Á' | 'Ạ' | 'Ả' | 'Ã' | 'Â' | 'Ầ' | 'Ấ' | 'Ậ' | 'Ẩ' | 'Ẫ' | 'Ă' | 'Ằ' | 'Ắ' | 'Ặ' | 'Ẳ' | 'Ẵ' => 'A',
        'è' | 'é' | 'ẹ' | 'ẻ' | 'ẽ' | 'ê' | 'ề' | 'ế' | 'ệ' | 'ể' | 'ễ' => 'e',
        'È' | 'É' | 'Ẹ' | 'Ẻ' | 'Ẽ' | 'Ê' | 'Ề' | 'Ế' | 'Ệ' | 'Ể' | 'Ễ' => 'E',
        'ì' | 'í' | 'ị' | 'ỉ' | 'ĩ' => 'i',
        'Ì' | 'Í' | 'Ị' | 'Ỉ' | 'Ĩ' => 'I',
        'ò' | 'ó' | 'ọ' | 'ỏ' | 'õ' | 'ô' | 'ồ' | 'ố' | 'ộ' | 'ổ' | 'ỗ' | 'ơ' | 'ờ' | 'ớ' | 'ợ' | 'ở' | 'ỡ' => 'o',
        'Ò' | 'Ó' | 'Ọ' | 'Ỏ' | 'Õ' | 'Ô' | 'Ồ' | 'Ố' | 'Ộ' | 'Ổ' | 'Ỗ' | 'Ơ' | 'Ờ' | 'Ớ' | 'Ợ' | 'Ở' | 'Ỡ' => 'O',
        'ù' | 'ú' | 'ụ' | 'ủ' | 'ũ' | 'ư' | 'ừ' | 'ứ' | 'ự' | 'ử' | 'ữ' => 'u',
        'Ù' | 'Ú' | 'Ụ' | 'Ủ' | 'Ũ' | 'Ư' | 'Ừ' | 'Ứ' | 'Ự' | 'Ử' | 'Ữ' => 'U',
        'ỳ' | 'ý' | 'ỵ' | 'ỷ' | 'ỹ' => 'y',
        'Ỳ' | 'Ý' | 'Ỵ' | 'Ỷ' | 'Ỹ' => 'Y',
        'đ' => 'd',
        'Đ' => 'D',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{customer, ice_cream, order, topping};

    fn sample() -> Order {
        let mut o = order("o1", "c1", "s1", NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(), 0.0);
        o.company_name = "Đại lý Kem Hương".into();
        o.customer_name = "Chị Hương".into();
        o.ice_cream_items = vec![ice_cream("Socola", 10, 50_000.0)];
        o.topping_items = vec![topping("Ốc quế", 2, 20_000.0)];
        o.discount_items = vec![ice_cream("Dâu", 2, 0.0)];
        o.discount_items[0].total = 0.0;
        o.gift_items = vec![topping("Tủ đông mini", 1, 150_000.0)];
        o.total_ice_cream_revenue = 500_000.0;
        o.total_topping_revenue = 40_000.0;
        o.total_revenue = 540_000.0;
        o.shipping_cost = Some(30_000.0);
        o.final_amount = Some(570_000.0);
        o.deposit_amount = Some(285_000.0);
        o
    }

    fn parties() -> QuoteParties<'static> {
        QuoteParties { customer: None, sales_name: "Anh Tú".into(), author_name: "Anh Tú".into() }
    }

    #[test]
    fn grand_totals_separate_value_from_payment() {
        let doc = build_quote(&sample(), &parties());
        assert_eq!(doc.grand_total_value, 720_000.0);
        assert_eq!(doc.grand_total_payment, 570_000.0);
        assert_eq!(doc.deposit, 285_000.0);
        assert_eq!(doc.file_name, "Order_Dai ly Kem Huong_2025-07-01.pdf");
    }

    #[test]
    fn sections_follow_the_printed_layout() {
        let doc = build_quote(&sample(), &parties());
        let titles: Vec<_> = doc.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["I", "II", "III"]);
        assert_eq!(doc.sections[0].subtotal.quantity, "10");
        assert_eq!(doc.sections[0].rows[0].name, "Kem Socola");
        let promo = &doc.sections[2];
        assert_eq!(promo.rows[0].name, "[CK] Kem Dâu");
        assert_eq!(promo.rows[0].total, "0");
        assert_eq!(promo.rows[1].name, "[Quà] Tủ đông mini");
        assert_eq!(promo.rows[1].stt, "2");
        assert_eq!(promo.subtotal.total, "150.000");
        assert_eq!(doc.info.last().unwrap().0, "Người liên hệ");
    }

    #[test]
    fn draft_quote_prints_customer_contact_and_skips_empty_toppings() {
        let mut o = sample();
        o.topping_items.clear();
        let c = customer("c1", "s1", "1 Lý Thường Kiệt, Hà Nội");
        let doc = build_quote(&o, &QuoteParties { customer: Some(&c), ..parties() });
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.info[3], ("Địa chỉ khách hàng".to_string(), "1 Lý Thường Kiệt, Hà Nội".to_string()));
        let text = render_text(&doc);
        assert!(text.contains("ĐƠN ĐẶT HÀNG KEM"));
        assert!(text.contains("Tổng giá trị thanh toán (I + II + IV): 570.000"));
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(999.0), "999");
        assert_eq!(format_number(1_000.0), "1.000");
        assert_eq!(format_number(1_234_567.4), "1.234.567");
        assert_eq!(format_number(-50_000.0), "-50.000");
    }

    #[test]
    fn tones_are_stripped() {
        assert_eq!(remove_vietnamese_tones("Đơn đặt hàng kem"), "Don dat hang kem");
        assert_eq!(remove_vietnamese_tones("Phường Bàn Cờ"), "Phuong Ban Co");
    }
}
