//! Product overlay page object
//!
//! Holds the queries for every part of the product overlay. Queries that
//! depend on the selected color live in a [`ColorQueries`] snapshot which is
//! replaced as a whole when the color changes.

use crate::error::Result;
use crate::query::{ElementQuery, ElementRef, Query};

const OVERLAY: &str = "div.shared-modal";
const PRODUCT_NAME: &str = r#"//div[@class="product-detail__name"]"#;
const COLOR_INPUTS: &str = r#"//div[contains(@class,"product-detail__color-options")]//input"#;
const SIZE_BUTTONS: &str = r#"//div[contains(@class,"product-detail__size-options")]//button"#;
const PRICE: &str = r#"//div[@class="product-detail__price"]"#;
const TAB_CONTENT: &str = r#"//div[@class="product-info__tab-content"]"#;
const FOOTER: &str = r#"//footer[@class="product-sticky-footer"]"#;
const FOOTER_NAME: &str = ".product-sticky-footer__name";
const FOOTER_ADD_TO_CART: &str = ".product-sticky-footer__add-cart-button";

/// Color-dependent queries, always derived from a single color token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorQueries {
    /// Normalized (uppercase) color token
    pub color: String,
    /// Product image on the listing page, opens the overlay
    pub product_image: Query,
    /// Slideshow images inside the overlay
    pub overlay_images: Query,
}

/// Build the color-dependent queries for `color` (matched case-insensitively)
pub fn derive_queries(overlay: &Query, color: &str) -> ColorQueries {
    let color = color.to_uppercase();
    let image = format!(r#"//img[contains(@src, "{}")]"#, color);
    ColorQueries {
        product_image: Query::xpath(image.clone()),
        overlay_images: overlay.locator(Query::xpath(image)),
        color,
    }
}

fn swatch_query(color: &str) -> Query {
    Query::xpath(format!(
        r#"//div[contains(@class,"product-detail__color-options")]//input[contains(@alt,'.webp') and contains(@alt,'{}')]"#,
        color.to_uppercase()
    ))
}

fn tab_query(tab: &str) -> Query {
    Query::xpath(format!(
        r#"//li[contains(@class, "product-info__tab-item") and contains(text(), "{}")]"#,
        tab.to_uppercase()
    ))
}

pub struct ProductPage<Q> {
    query: Q,
    overlay: Query,
    product_name: Query,
    colors: Query,
    sizes: Query,
    price: Query,
    tab_content: Query,
    footer: Query,
    footer_name: Query,
    footer_add_to_cart: Query,
    color_queries: ColorQueries,
}

impl<Q: ElementQuery> ProductPage<Q> {
    /// Build every query for a product shown in `initial_color`; touches no page
    pub fn new(query: Q, initial_color: &str) -> Self {
        let overlay = Query::css(OVERLAY);
        let footer = overlay.locator(Query::xpath(FOOTER));
        let color_queries = derive_queries(&overlay, initial_color);
        Self {
            query,
            product_name: overlay.locator(Query::xpath(PRODUCT_NAME)),
            colors: overlay.locator(Query::xpath(COLOR_INPUTS)),
            sizes: overlay.locator(Query::xpath(SIZE_BUTTONS)),
            price: overlay.locator(Query::xpath(PRICE)),
            tab_content: overlay.locator(Query::xpath(TAB_CONTENT)),
            footer_name: footer.locator(Query::css(FOOTER_NAME)),
            footer_add_to_cart: footer.locator(Query::css(FOOTER_ADD_TO_CART)),
            footer,
            overlay,
            color_queries,
        }
    }

    /// The element-query collaborator this page was built on
    pub fn query(&self) -> &Q {
        &self.query
    }

    /// Currently selected color, uppercase
    pub fn color(&self) -> &str {
        &self.color_queries.color
    }

    pub fn color_queries(&self) -> &ColorQueries {
        &self.color_queries
    }

    /// Point the image queries at `new_color`
    ///
    /// Only rebuilds queries, so it never fails. It does not click anything;
    /// see [`switch_color`](Self::switch_color) to do both.
    pub fn set_color(&mut self, new_color: &str) {
        self.color_queries = derive_queries(&self.overlay, new_color);
        log::debug!("Image queries now follow color {}", self.color_queries.color);
    }

    /// Click the swatch whose image alt text names `color`
    ///
    /// The image queries keep following the previous color until
    /// [`set_color`](Self::set_color) is called.
    pub async fn select_color_swatch(&self, color: &str) -> Result<()> {
        log::info!("Selecting color swatch {}", color.to_uppercase());
        self.query.click(&self.color_swatch(color).first()).await
    }

    /// Click the swatch for `color`, then point the image queries at it
    pub async fn switch_color(&mut self, color: &str) -> Result<()> {
        self.select_color_swatch(color).await?;
        self.set_color(color);
        Ok(())
    }

    /// Click the content tab whose label contains `tab`
    pub async fn select_tab(&self, tab: &str) -> Result<()> {
        log::info!("Selecting tab {}", tab.to_uppercase());
        self.query.click(&self.tab(tab).first()).await
    }

    /// Open the overlay from the listing page
    pub async fn click_product_image(&self) -> Result<()> {
        self.query
            .click(&self.color_queries.product_image.first())
            .await
    }

    pub async fn image_count(&self) -> Result<usize> {
        self.query.count(&self.color_queries.overlay_images).await
    }

    pub fn image(&self, index: usize) -> ElementRef {
        self.color_queries.overlay_images.nth(index)
    }

    pub async fn colors_count(&self) -> Result<usize> {
        self.query.count(&self.colors).await
    }

    pub fn color_input(&self, index: usize) -> ElementRef {
        self.colors.nth(index)
    }

    pub async fn sizes_count(&self) -> Result<usize> {
        self.query.count(&self.sizes).await
    }

    pub fn size(&self, index: usize) -> ElementRef {
        self.sizes.nth(index)
    }

    /// Swatch input for `color` inside the overlay
    pub fn color_swatch(&self, color: &str) -> Query {
        self.overlay.locator(swatch_query(color))
    }

    /// Tab item whose label contains `tab`
    pub fn tab(&self, tab: &str) -> Query {
        self.overlay.locator(tab_query(tab))
    }

    pub fn overlay(&self) -> &Query {
        &self.overlay
    }

    pub fn overlay_images(&self) -> &Query {
        &self.color_queries.overlay_images
    }

    pub fn product_name(&self) -> &Query {
        &self.product_name
    }

    pub fn colors(&self) -> &Query {
        &self.colors
    }

    pub fn sizes(&self) -> &Query {
        &self.sizes
    }

    pub fn price(&self) -> &Query {
        &self.price
    }

    pub fn tab_content(&self) -> &Query {
        &self.tab_content
    }

    pub fn footer(&self) -> &Query {
        &self.footer
    }

    pub fn footer_name(&self) -> &Query {
        &self.footer_name
    }

    pub fn footer_add_to_cart(&self) -> &Query {
        &self.footer_add_to_cart
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SuiteError;
    use crate::query::stub::{StubDom, StubElement};
    use crate::query::Selector;

    fn images(color: &str, n: usize) -> Vec<StubElement> {
        (0..n)
            .map(|i| StubElement::new().attr("src", &format!("/img/tee_{}_{}.webp", color, i)))
            .collect()
    }

    #[test]
    fn test_derive_queries_normalizes_color() {
        let overlay = Query::css(OVERLAY);
        let queries = derive_queries(&overlay, "navy");

        assert_eq!(queries.color, "NAVY");
        assert_eq!(
            queries.product_image,
            Query::xpath(r#"//img[contains(@src, "NAVY")]"#)
        );
        assert_eq!(queries.overlay_images.chain()[0], Selector::Css(OVERLAY.to_string()));
        assert_eq!(
            queries.overlay_images.chain()[1],
            Selector::Xpath(r#"//img[contains(@src, "NAVY")]"#.to_string())
        );
        assert_eq!(derive_queries(&overlay, "Navy"), queries);
    }

    #[tokio::test]
    async fn test_set_color_replaces_image_queries() {
        let dom = StubDom::new();
        let mut page = ProductPage::new(dom.clone(), "white");
        let white = page.overlay_images().clone();
        dom.set(&white, images("WHITE", 3));

        assert_eq!(page.color(), "WHITE");
        assert_eq!(page.image_count().await.unwrap(), 3);

        page.set_color("navy");
        let navy = page.overlay_images().clone();
        dom.set(&navy, images("NAVY", 2));

        assert_eq!(page.color(), "NAVY");
        assert_ne!(white, navy);
        assert_eq!(page.image_count().await.unwrap(), 2);
        assert_eq!(page.image(1).query(), &navy);
        assert_eq!(
            page.color_queries().product_image,
            Query::xpath(r#"//img[contains(@src, "NAVY")]"#)
        );
    }

    #[tokio::test]
    async fn test_fixed_queries_ignore_color() {
        let mut page = ProductPage::new(StubDom::new(), "WHITE");
        let sizes = page.sizes().clone();
        let footer_name = page.footer_name().clone();

        page.set_color("NAVY");

        assert_eq!(page.sizes(), &sizes);
        assert_eq!(page.footer_name(), &footer_name);
        assert_eq!(footer_name.chain().len(), 3);
    }

    #[tokio::test]
    async fn test_swatch_click_leaves_queries_alone() {
        let dom = StubDom::new();
        let page = ProductPage::new(dom.clone(), "WHITE");
        let swatch = page.overlay().locator(swatch_query("NAVY"));
        dom.set(&swatch, vec![StubElement::new().attr("alt", "tee_NAVY.webp")]);

        page.select_color_swatch("navy").await.unwrap();

        assert_eq!(dom.clicks(), vec![swatch.first()]);
        assert_eq!(page.color(), "WHITE");
    }

    #[tokio::test]
    async fn test_switch_color_clicks_then_updates() {
        let dom = StubDom::new();
        let mut page = ProductPage::new(dom.clone(), "WHITE");
        let swatch = page.overlay().locator(swatch_query("NAVY"));
        dom.set(&swatch, vec![StubElement::new().attr("alt", "tee_NAVY.webp")]);

        page.switch_color("Navy").await.unwrap();

        assert_eq!(dom.clicks().len(), 1);
        assert_eq!(page.color(), "NAVY");
    }

    #[tokio::test]
    async fn test_switch_to_unknown_color_keeps_state() {
        let dom = StubDom::new();
        let mut page = ProductPage::new(dom, "WHITE");

        let err = page.switch_color("PURPLE").await.unwrap_err();

        assert!(matches!(err, SuiteError::ElementNotFound(_)));
        assert_eq!(page.color(), "WHITE");
    }

    #[tokio::test]
    async fn test_select_tab_matches_uppercase_label() {
        let dom = StubDom::new();
        let page = ProductPage::new(dom.clone(), "WHITE");
        let tab = page.overlay().locator(Query::xpath(
            r#"//li[contains(@class, "product-info__tab-item") and contains(text(), "DETAILS")]"#,
        ));
        dom.set(&tab, vec![StubElement::with_text("DETAILS")]);

        page.select_tab("details").await.unwrap();

        assert_eq!(dom.clicks(), vec![tab.first()]);
    }

    #[tokio::test]
    async fn test_click_product_image_uses_current_color() {
        let dom = StubDom::new();
        let page = ProductPage::new(dom.clone(), "white");
        dom.set(&Query::xpath(r#"//img[contains(@src, "WHITE")]"#), images("WHITE", 1));

        page.click_product_image().await.unwrap();

        assert_eq!(dom.clicks()[0].query(), &page.color_queries().product_image);
    }

    #[tokio::test]
    async fn test_counts_and_indexed_accessors() {
        let dom = StubDom::new();
        let page = ProductPage::new(dom.clone(), "WHITE");
        dom.set(
            page.sizes(),
            vec![StubElement::with_text("S"), StubElement::with_text("M")],
        );
        dom.set(page.colors(), images("WHITE", 1));

        assert_eq!(page.sizes_count().await.unwrap(), 2);
        assert_eq!(page.colors_count().await.unwrap(), 1);
        assert_eq!(
            dom.text(&page.size(1)).await.unwrap(),
            Some("M".to_string())
        );
        assert_eq!(page.color_input(0).index(), 0);

        // Out of range surfaces as the collaborator's not-found failure
        let err = dom.text(&page.size(2)).await.unwrap_err();
        assert!(matches!(err, SuiteError::ElementNotFound(_)));
    }
}
