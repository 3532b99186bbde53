pub const HOME_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Lung Cancer Detection</title>
</head>
<body>
    <h1>Lung Cancer Detection</h1>
    <p>Choose the kind of image to classify.</p>
    <ul>
        <li><a href="/ct_scan">CT scan</a></li>
        <li><a href="/histo_image">Histopathology slide</a></li>
    </ul>
</body>
</html>
"#;

const UPLOAD_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
</head>
<body>
    <h1>{title}</h1>
    <form id="upload" action="{action}" method="post" enctype="multipart/form-data">
        <input type="file" name="file" accept=".png,.jpg,.jpeg">
        <button type="submit">Predict</button>
    </form>
    <p id="result"></p>
    <p><a href="/">Back</a></p>
    <script>
        document.getElementById('upload').addEventListener('submit', async (e) => {
            e.preventDefault();
            const out = document.getElementById('result');
            out.textContent = 'Predicting...';
            const res = await fetch('{action}', { method: 'POST', body: new FormData(e.target) });
            const body = await res.json();
            out.textContent = res.ok ? 'Prediction: ' + body.result : body.error;
        });
    </script>
</body>
</html>
"#;

pub fn upload_page(title: &str, action: &str) -> String {
    UPLOAD_TEMPLATE
        .replace("{title}", title)
        .replace("{action}", action)
}
