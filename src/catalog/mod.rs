//! Product catalog and size guides

use serde::Serialize;

use crate::core::category::Category;

/// Currency suffix used on every price
pub const CURRENCY: &str = "DT";

/// One product card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub category: Category,
    pub title: String,
    /// Price in dinars
    pub price: u32,
    pub price_label: String,
    pub description: &'static str,
    pub sizes: &'static [&'static str],
}

/// One row of a size guide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeGuideRow {
    pub size: &'static str,
    /// Height of the wearer, in centimetres
    pub height_range: (u16, u16),
    /// Length of the garment, in centimetres
    pub blouza_length: (u16, u16),
}

impl SizeGuideRow {
    const fn new(size: &'static str, height: (u16, u16), length: (u16, u16)) -> Self {
        Self {
            size,
            height_range: height,
            blouza_length: length,
        }
    }

    pub fn fits_height(&self, height_cm: u16) -> bool {
        (self.height_range.0..=self.height_range.1).contains(&height_cm)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizeGuide {
    pub category: Category,
    pub title: String,
    pub rows: &'static [SizeGuideRow],
}

impl SizeGuide {
    /// The size whose height range contains `height_cm`
    pub fn suggest(&self, height_cm: u16) -> Option<&'static str> {
        self.rows
            .iter()
            .find(|row| row.fits_height(height_cm))
            .map(|row| row.size)
    }
}

const MEN_GUIDE: &[SizeGuideRow] = &[
    SizeGuideRow::new("S", (160, 169), (112, 118)),
    SizeGuideRow::new("M", (170, 179), (119, 125)),
    SizeGuideRow::new("L", (180, 189), (126, 132)),
    SizeGuideRow::new("XL", (190, 199), (133, 139)),
];

const WOMEN_GUIDE: &[SizeGuideRow] = &[
    SizeGuideRow::new("S", (150, 159), (97, 103)),
    SizeGuideRow::new("M", (160, 169), (104, 110)),
    SizeGuideRow::new("L", (170, 179), (111, 117)),
    SizeGuideRow::new("XL", (180, 189), (118, 124)),
];

fn price(category: Category) -> u32 {
    match category {
        Category::Men => 85,
        Category::Women => 95,
        Category::Kids => 65,
    }
}

fn description(category: Category) -> &'static str {
    match category {
        Category::Men => {
            "Élégance et authenticité pour l'homme moderne. Confectionnée avec soin selon la \
             tradition djerbienne, cette blouza allie confort et prestige."
        }
        Category::Women => {
            "Féminité et tradition dans un vêtement d'exception. Broderies délicates et \
             finitions raffinées pour célébrer l'élégance tunisienne."
        }
        Category::Kids => {
            "Transmettez les valeurs traditionnelles à vos enfants. Confortable et colorée, \
             parfaite pour les occasions spéciales et le quotidien."
        }
    }
}

pub fn product(category: Category) -> Product {
    let price = price(category);
    Product {
        category,
        title: category.display_label(),
        price,
        price_label: format!("{price} {CURRENCY}"),
        description: description(category),
        sizes: category.sizes(),
    }
}

/// Every product, in display order
pub fn products() -> Vec<Product> {
    Category::ALL.into_iter().map(product).collect()
}

/// Height table for adult categories; kids sizes are already by age
pub fn size_guide(category: Category) -> Option<SizeGuide> {
    let rows = match category {
        Category::Men => MEN_GUIDE,
        Category::Women => WOMEN_GUIDE,
        Category::Kids => return None,
    };
    Some(SizeGuide {
        category,
        title: format!("Guide des tailles - {}", category.display_label()),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_products_in_order() {
        let products = products();
        let titles: Vec<_> = products.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Blouza Homme", "Blouza Femme", "Blouza Enfant"]);
        assert_eq!(products[1].price_label, "95 DT");
        assert_eq!(products[2].sizes, &["4-6 ans", "7-9 ans", "10-12 ans", "13-15 ans"]);
    }

    #[test]
    fn test_size_guides() {
        let men = size_guide(Category::Men).unwrap();
        assert_eq!(men.title, "Guide des tailles - Blouza Homme");
        assert_eq!(men.suggest(175), Some("M"));
        assert_eq!(men.suggest(150), None);

        let women = size_guide(Category::Women).unwrap();
        assert_eq!(women.suggest(150), Some("S"));
        assert_eq!(women.rows[3].blouza_length, (118, 124));

        assert!(size_guide(Category::Kids).is_none());
    }

    #[test]
    fn test_guide_sizes_match_category_sizes() {
        for category in [Category::Men, Category::Women] {
            let guide = size_guide(category).unwrap();
            let sizes: Vec<_> = guide.rows.iter().map(|r| r.size).collect();
            assert_eq!(sizes, category.sizes());
        }
    }

    #[test]
    fn test_product_json_shape() {
        let json = serde_json::to_value(product(Category::Men)).unwrap();
        assert_eq!(json["category"], "men");
        assert_eq!(json["priceLabel"], "85 DT");
        assert_eq!(json["price"], 85);
    }
}
