use ammonia;

/// Clean HTML content using the ammonia library.
///
/// Whitelist-based: safe tags (like <b>, <p>) are kept, dangerous tags
/// (like <script>, <iframe>) and event-handler attributes are stripped.
/// `<script>` and `<style>` lose their content as well.
///
/// Applied to challenge descriptions and question explanations, which the
/// frontend renders as HTML.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
