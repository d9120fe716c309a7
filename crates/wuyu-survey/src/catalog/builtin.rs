//! Built-in catalog of the Shanghainese attitude questionnaire.

use super::{CatalogConfig, DEFAULT_REGION_FIELD, FieldCatalog, FieldKind, FieldSpec, RawFilter, RegionSpec};

const Q16_LEARN_FOR_HERITAGE: &str = "16.你是否愿意为了传承文化去特意学习上海话？";
const Q16_KEEP_ANSWER: &str = "D.无所谓（请直接选择此项）";

const Q1_GENDER: &str = "1.你的性别是？";
const Q6_NATIVE: &str = "6.你是否为上海本地人？";

const NATIVE_BORN: &str = "A.是，在上海出生并长大";
const NATIVE_LONG_TERM: &str = "B.否，但在上海生活超过5年";
const NATIVE_SHORT_TERM: &str = "C.否，在上海生活不足5年";

const Q21_PREFIX: &str = "21.你通常在以下哪些场合使用上海话？:";
const Q21_OPTIONS: [(&str, &str); 5] = [
    ("与家人交流", "family_use"),
    ("与朋友交流", "friend_use"),
    ("在本地社区或邻里间", "local_community_use"),
    ("在工作/兼职中", "work_use"),
    ("基本不用", "basic_no_use"),
];

const Q24_PREFIX: &str = "24.你看过或听过以下哪类与上海话有关的内容？:";
const Q24_OPTIONS: [(&str, &str); 5] = [
    ("上海话配音短视频", "shanghainese_dubbling_tiktok"),
    ("上海话电视剧/电影", "shanghainese_movies"),
    ("上海话广播/音频节目", "shanghainese_radio"),
    ("上海话学习类内容", "shanghainese_learning_resources"),
    ("几乎没有接触过", "never_shanghainese_content"),
];

fn ordinal(raw: &str, canonical: &str) -> FieldSpec {
    FieldSpec::new(raw, canonical, FieldKind::ordinal())
}

fn scale(raw: &str, canonical: &str, scale: &[(&str, f64)]) -> FieldSpec {
    FieldSpec::new(raw, canonical, FieldKind::fixed_scale(scale.iter().copied()))
}

fn passthrough(raw: &str, canonical: &str) -> FieldSpec {
    FieldSpec::new(raw, canonical, FieldKind::Passthrough)
}

fn multi_select(prefix: &str, options: &[(&str, &str)]) -> impl Iterator<Item = FieldSpec> {
    options.iter().map(move |(option, canonical)| {
        FieldSpec::new(format!("{prefix}{option}"), *canonical, FieldKind::MultiSelectFlag).metric()
    })
}

/// Returns the full questionnaire catalog.
///
/// Only respondents who answered Q16 with the attention-check option are kept.
#[must_use]
pub fn shanghainese_survey() -> FieldCatalog {
    let mut fields = vec![
        passthrough(Q1_GENDER, "gender"),
        scale(Q1_GENDER, "gender_code", &[("A.男", 1.0), ("B.女", 0.0), ("C.其他", 2.0)]),
        FieldSpec::new(
            Q1_GENDER,
            "gender_str",
            FieldKind::relabel([("A.男", "男"), ("B.女", "女"), ("C.其他", "其他")]),
        ),
        FieldSpec::new("2.你的年级是？", "grade", FieldKind::ordinal_with_label("grade_str")),
        FieldSpec::new("4.你的专业类型是？", "major", FieldKind::ordinal_with_label("major_str")),
        passthrough("5.你目前就读的学校是？", "school"),
        passthrough(Q6_NATIVE, "native"),
        FieldSpec::new(Q6_NATIVE, "native_flag", FieldKind::indicator(NATIVE_BORN)),
        FieldSpec::new(Q6_NATIVE, "long_term_sh", FieldKind::indicator(NATIVE_LONG_TERM)),
        FieldSpec::new(
            Q6_NATIVE,
            "native_str",
            FieldKind::relabel([
                (NATIVE_BORN, "上海本地人(出生并长大)"),
                (NATIVE_LONG_TERM, "长期居住上海(>5年)"),
                (NATIVE_SHORT_TERM, "短期居住上海(<5年)"),
            ]),
        ),
        passthrough("7.你的父母是否为上海本地人？", "parents"),
        ordinal("8.你对上海话的整体印象是？", "overall_impression").metric(),
        scale(
            "9.你认为上海话属于一种：",
            "shanghainese_attitude",
            &[
                ("A.地方语言，应予保护", 4.0),
                ("B.沟通工具，实用即可", 3.0),
                ("D.无所谓", 2.0),
                ("C.方言，逐渐消失是自然现象", 1.0),
            ],
        )
        .metric(),
        scale(
            "10.你认为学习/会说上海话是否是一种“本地身份”的象征？",
            "identity",
            &[("A.是的", 4.0), ("B.部分是", 3.0), ("D.不清楚", 2.0), ("C.否", 1.0)],
        )
        .metric(),
        scale(
            "11.你对大学中开设上海话课程的态度是？",
            "course_attitude",
            &[("A.非常支持", 4.0), ("B.支持", 3.0), ("C.无所谓", 2.0), ("D.反对", 1.0)],
        )
        .metric(),
        scale(
            "12.你是否认同“年轻一代应该会说一些上海话”？",
            "young_should",
            &[
                ("A.非常认同", 4.0),
                ("B.认同", 3.0),
                ("C.不太认同", 2.0),
                ("D.完全不认同", 1.0),
            ],
        )
        .metric(),
        scale(
            "13.你觉得上海话在现代社会中的地位是？",
            "social_status_of_shanghainese",
            &[
                ("A.重要，应重视", 4.0),
                ("B.一般，可保留可取代", 3.0),
                ("D.难说", 2.0),
                ("C.不重要", 1.0),
            ],
        )
        .metric(),
        ordinal("14.你对在公共场合听到上海话的看法是？", "public_hear_view").metric(),
        ordinal("15.你对私人场合使用上海话交流的看法是？", "private_use_view").metric(),
        scale(
            "17.你是否觉得学校或社会应该提供更多学习上海话的机会？",
            "more_learning_opportunity",
            &[("A.是", 1.0), ("B.否", -1.0), ("C.无所谓", 0.0)],
        )
        .metric(),
        ordinal("18.你是否会说上海话？", "speaking_ability").metric(),
        ordinal("19.你能听懂上海话的程度是？", "listening_ability").metric(),
        passthrough("20.你与家人交流时最常用的语言是？", "family_language"),
    ];

    fields.extend(multi_select(Q21_PREFIX, &Q21_OPTIONS));
    fields.extend([
        ordinal("22.你使用上海话的频率是？", "usage_freq").metric(),
        ordinal("23.你会使用上海话发微信/社交平台信息吗？", "sns_use_freq").metric(),
    ]);
    fields.extend(multi_select(Q24_PREFIX, &Q24_OPTIONS));
    fields.extend([
        scale(
            "25.你是否关注过沪语博主（如G僧东、册那队长等）？",
            "follow_sh_blogger",
            &[("A.是", 1.0), ("B.否", 0.0)],
        )
        .metric(),
        ordinal("26.你对此类沪语视频的看法是？", "video_view").metric(),
        FieldSpec::new(
            "27.你是否曾因不会说上海话而感到尴尬/被排斥？",
            "awkward_score",
            FieldKind::SignedLikert,
        )
        .metric(),
        ordinal("28.你认为目前的语言环境是否支持上海话的使用？", "env_support").metric(),
        passthrough("3.你来自于：_填空1", "Province"),
        passthrough("3.你来自于：_填空2", "City"),
    ]);

    let config = CatalogConfig {
        fields,
        region: Some(RegionSpec {
            province: "Province".to_owned(),
            city: "City".to_owned(),
            output: DEFAULT_REGION_FIELD.to_owned(),
        }),
        prefilter: vec![RawFilter {
            raw_name: Q16_LEARN_FOR_HERITAGE.to_owned(),
            equals: Q16_KEEP_ANSWER.to_owned(),
        }],
    };

    match FieldCatalog::new(config) {
        Ok(catalog) => catalog,
        Err(err) => panic!("built-in catalog is invalid: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = shanghainese_survey();
        assert_eq!(catalog.prefilter().len(), 1);
        assert_eq!(catalog.region().unwrap().output, "Region");
        assert!(catalog.output_columns().contains(&"major_str"));
        assert!(catalog.output_columns().contains(&"Region"));
    }

    #[test]
    fn test_builtin_metric_fields() {
        let catalog = shanghainese_survey();
        let metrics = catalog
            .fields()
            .iter()
            .filter(|f| f.metric)
            .map(|f| f.canonical_name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(metrics.len(), 27);
        for name in ["awkward_score", "identity", "family_use", "follow_sh_blogger", "env_support"] {
            assert!(metrics.contains(&name), "{name} should be a metric");
        }
        for name in ["gender", "major", "Province", "native_flag"] {
            assert!(!metrics.contains(&name), "{name} should not be a metric");
        }
    }

    #[test]
    fn test_multi_select_raw_names() {
        let catalog = shanghainese_survey();
        let spec = catalog.field("work_use").unwrap();
        assert_eq!(spec.raw_name, "21.你通常在以下哪些场合使用上海话？:在工作/兼职中");
        assert_eq!(spec.kind, FieldKind::MultiSelectFlag);
    }
}
