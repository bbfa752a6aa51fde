/*!
# API documentation

This page describes the API endpoints available on the service.

## Keywords

Endpoint: `/api/v1/keywords`, also served at `/.netlify/functions/keywords`

Example: `/api/v1/keywords?q=cats`

Asks every configured provider for autocomplete suggestions for a keyword and
returns all of them in one response. The providers are asked at the same time,
and a provider that fails or answers with something unexpected contributes an
empty list instead of failing the request.

This endpoint accepts GET requests. `OPTIONS` requests are answered with an
empty `204 No Content` response carrying the CORS headers.

### Query Parameters

- `q` - The keyword to complete. Surrounding whitespace is removed. A missing
  or blank value is rejected.

### Response

Every response from this endpoint carries these headers, so that it can be
called from any web page:

- `Access-Control-Allow-Origin: *`
- `Access-Control-Allow-Methods: GET, OPTIONS`
- `Access-Control-Allow-Headers: Content-Type`

A successful response has status 200 and a JSON body with the keyword and one
list per provider, always in this order:

```json
{
  "keyword": "cats",
  "google": ["cats and dogs", "cats movie"],
  "youtube": ["cats song"],
  "tiktok": ["cats dancing"],
  "instagram": [
    { "name": "cats", "count": 12500000 },
    { "name": "catsofinstagram", "count": null }
  ]
}
```

- `keyword` - The keyword that was asked about, trimmed.
- `google`, `youtube`, `tiktok` - Lists of suggested search terms.
- `instagram` - Up to ten hashtags, each with its name and the number of posts
  using it, or `null` if the platform did not say.

If `q` is missing or blank, the response has status 400 and the body:

```json
{ "error": "Missing query parameter: q" }
```

No provider is contacted for a rejected request.

## Dockerflow

These endpoints are used by the deployment infrastructure.

- `/__lbheartbeat__` - Returns an empty 200 response while the server can
  handle requests.
- `/__heartbeat__` - Returns a JSON object with the running version.
- `/__version__` - Returns the `version.json` stamped at build time.
- `/__error__` - Always fails with a 500 response, to test error reporting.
*/
