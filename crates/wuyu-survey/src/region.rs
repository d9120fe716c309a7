//! Province normalization and coarse region classification.
//!
//! Respondents type their province and city free-form. The classifier cleans
//! the province, lets a municipality city override the province, and looks the
//! result up in a fixed province-to-region table.
//!
//! # Examples
//!
//! ```
//! use wuyu_survey::region::{OTHER_REGION, RegionClassifier};
//!
//! let classifier = RegionClassifier::new();
//! assert_eq!(classifier.classify(Some("浙江省"), Some("杭州")), "华东");
//! assert_eq!(classifier.classify(Some("广西壮族自治区"), None), "华南");
//! assert_eq!(classifier.classify(None, Some("上海市")), "上海本地");
//! assert_eq!(classifier.classify(Some("火星"), None), OTHER_REGION);
//! ```

/// Region of any province missing from the table, including blank input.
pub const OTHER_REGION: &str = "其他地区";

const PROVINCE_SUFFIXES: [&str; 8] = [
    "省",
    "市",
    "自治区",
    "特别行政区",
    "回族",
    "壮族",
    "维吾尔",
    "维吾尔族",
];

const SUFFIX_PASSES: usize = 2;

const MUNICIPALITIES: [(&str, &[&str]); 4] = [
    ("上海", &["上海", "上海市"]),
    ("北京", &["北京", "北京市"]),
    ("天津", &["天津", "天津市"]),
    ("重庆", &["重庆", "重庆市"]),
];

/// Province-to-region table.
pub const PROVINCE_REGIONS: [(&str, &str); 28] = [
    ("上海", "上海本地"),
    ("江苏", "华东"),
    ("浙江", "华东"),
    ("安徽", "华东"),
    ("福建", "华东"),
    ("山东", "华东"),
    ("江西", "华东"),
    ("广东", "华南"),
    ("广西", "华南"),
    ("海南", "华南"),
    ("北京", "华北"),
    ("天津", "华北"),
    ("河北", "华北"),
    ("山西", "华北"),
    ("内蒙古", "华北"),
    ("四川", "西南"),
    ("重庆", "西南"),
    ("云南", "西南"),
    ("贵州", "西南"),
    ("西藏", "西南"),
    ("陕西", "西北"),
    ("甘肃", "西北"),
    ("青海", "西北"),
    ("宁夏", "西北"),
    ("新疆", "西北"),
    ("辽宁", "东北"),
    ("吉林", "东北"),
    ("黑龙江", "东北"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct RegionClassifier {}

impl RegionClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }

    /// Cleans a province name and applies the municipality override.
    ///
    /// Each pass strips the first matching administrative suffix; two passes
    /// handle names such as `宁夏回族自治区`. When the city names a
    /// municipality, that municipality replaces the province.
    #[must_use]
    pub fn normalize_province(&self, province: Option<&str>, city: Option<&str>) -> String {
        let city = city.map(str::trim);
        if let Some((canonical, _)) = MUNICIPALITIES
            .iter()
            .find(|(_, aliases)| city.is_some_and(|c| aliases.contains(&c)))
        {
            return (*canonical).to_owned();
        }

        let mut name = province.map_or("", str::trim);
        for _ in 0..SUFFIX_PASSES {
            if let Some(stripped) = PROVINCE_SUFFIXES
                .iter()
                .find_map(|suffix| name.strip_suffix(suffix))
            {
                name = stripped;
            }
        }
        name.to_owned()
    }

    /// Returns the region of a respondent.
    #[must_use]
    pub fn classify(&self, province: Option<&str>, city: Option<&str>) -> &'static str {
        let province = self.normalize_province(province, city);
        region_of(&province).unwrap_or(OTHER_REGION)
    }
}

/// Looks up the region of an already normalized province.
#[must_use]
pub fn region_of(province: &str) -> Option<&'static str> {
    PROVINCE_REGIONS
        .iter()
        .find(|(name, _)| *name == province)
        .map(|(_, region)| *region)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_stripping() {
        let classifier = RegionClassifier::new();
        assert_eq!(classifier.normalize_province(Some("江苏省"), None), "江苏");
        assert_eq!(classifier.normalize_province(Some("宁夏回族自治区"), None), "宁夏");
        assert_eq!(
            classifier.normalize_province(Some("新疆维吾尔自治区"), None),
            "新疆"
        );
        assert_eq!(classifier.normalize_province(Some(" 内蒙古自治区 "), None), "内蒙古");
        assert_eq!(classifier.normalize_province(Some("香港特别行政区"), None), "香港");
    }

    #[test]
    fn test_municipality_city_overrides_province() {
        let classifier = RegionClassifier::new();
        for city in ["上海", "上海市"] {
            assert_eq!(classifier.classify(Some("江苏"), Some(city)), "上海本地");
            assert_eq!(classifier.classify(None, Some(city)), "上海本地");
        }
        assert_eq!(classifier.classify(Some("河北"), Some("北京市")), "华北");
        assert_eq!(classifier.classify(Some(""), Some("重庆")), "西南");
        assert_eq!(classifier.classify(Some("天津市"), Some("天津")), "华北");
    }

    #[test]
    fn test_regions() {
        let classifier = RegionClassifier::new();
        assert_eq!(classifier.classify(Some("广东省"), Some("深圳")), "华南");
        assert_eq!(classifier.classify(Some("四川"), Some("成都")), "西南");
        assert_eq!(classifier.classify(Some("甘肃省"), None), "西北");
        assert_eq!(classifier.classify(Some("黑龙江省"), None), "东北");
        // central provinces are not part of the table
        assert_eq!(classifier.classify(Some("湖北省"), Some("武汉")), OTHER_REGION);
    }

    #[test]
    fn test_unknown_and_blank_map_to_other() {
        let classifier = RegionClassifier::new();
        assert_eq!(classifier.classify(None, None), OTHER_REGION);
        assert_eq!(classifier.classify(Some("  "), None), OTHER_REGION);
        assert_eq!(classifier.classify(Some("台湾省"), None), OTHER_REGION);
        assert_eq!(classifier.classify(Some("省"), None), OTHER_REGION);
    }

    #[test]
    fn test_table_regions_are_known() {
        for (province, region) in PROVINCE_REGIONS {
            assert_eq!(region_of(province), Some(region));
            assert_ne!(region, OTHER_REGION);
        }
    }
}
