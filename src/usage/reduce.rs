use std::sync::LazyLock;

use regex::Regex;

/// 可约简键：由字母和点组成，以数字结尾
static NUMBERED_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z.]*[0-9]+$").expect("静态正则表达式")
});

/// 约简后键的最小长度
const MIN_REDUCED_LEN: usize = 3;

/// 去掉键末尾的数字后缀
///
/// 代码中常以 `"Key" + i` 的形式拼出 `Key1`、`Key2` 等键，
/// 因此按约简后的形式搜索用法。只要键仍匹配 `[a-zA-Z.]*[0-9]+`
/// 且长度大于 3，就去掉最后一个字符。
pub fn reduce_key(key: &str) -> &str {
    let mut reduced = key;
    while reduced.len() > MIN_REDUCED_LEN && NUMBERED_KEY.is_match(reduced) {
        reduced = &reduced[..reduced.len() - 1];
    }
    reduced
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Menu.File", "Menu.File")]
    #[case("Operation.Step12", "Operation.Step")]
    #[case("Item1", "Item")]
    #[case("abc1", "abc")]
    #[case("ab12", "ab1")]
    #[case("123456", "123")]
    #[case("Error_code1", "Error_code1")]
    #[case("Key1.Name2", "Key1.Name2")]
    #[case("K9", "K9")]
    fn test_reduce_key(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(reduce_key(key), expected);
    }
}
